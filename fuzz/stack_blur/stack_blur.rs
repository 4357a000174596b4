/*
 * // Copyright (c) Radzivon Bartoshyk. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stackblur_engine::{BackendDispatcher, BackendKind, PixelBuffer, ThreadingPolicy};

#[derive(Arbitrary, Debug)]
struct BlurInput {
    width: u8,
    height: u8,
    radius: u8,
    padding: u8,
    seed: u32,
}

fuzz_target!(|data: BlurInput| {
    fuzz_image(data);
});

fn fuzz_image(data: BlurInput) {
    if data.width == 0 || data.height == 0 {
        return;
    }
    let (width, height) = (data.width as u32, data.height as u32);
    let stride = width + (data.padding % 8) as u32;

    let mut state = data.seed | 1;
    let source_data = (0..stride * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        })
        .collect::<Vec<u32>>();
    let mut source = PixelBuffer::from_vec(source_data, width, height).unwrap();
    source.stride = stride;

    let dispatcher = BackendDispatcher::with_policy(ThreadingPolicy::Single).unwrap();
    let mut software = PixelBuffer::alloc(width, height);
    let mut native = PixelBuffer::alloc(width, height);
    let radius = data.radius as f32;

    dispatcher
        .blur(
            &source,
            radius,
            &mut software,
            Some(BackendKind::Software),
            None,
        )
        .unwrap();
    dispatcher
        .blur(
            &source,
            radius,
            &mut native,
            Some(BackendKind::NativeAccelerated),
            None,
        )
        .unwrap();
    assert!(software.same_pixels(&native));
}
