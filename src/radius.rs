// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use crate::{ArgumentError, BlurError};

/// Largest radius covered by the multiply/shift tables.
pub const MAX_RADIUS: u32 = 254;

/// Validated stack blur radius.
///
/// Fractional radii are truncated toward zero, radii above [`MAX_RADIUS`] are
/// clamped. Zero is the identity transform.
#[derive(Copy, Clone, Debug, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct BlurRadius(u32);

impl BlurRadius {
    pub fn new(radius: u32) -> BlurRadius {
        BlurRadius(radius.min(MAX_RADIUS))
    }

    pub fn from_f32(radius: f32) -> Result<BlurRadius, BlurError> {
        if !radius.is_finite() {
            return Err(ArgumentError::NonFiniteRadius.into());
        }
        if radius < 0. {
            return Err(ArgumentError::NegativeRadius.into());
        }
        Ok(BlurRadius::new(radius as u32))
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for BlurRadius {
    fn from(value: u32) -> Self {
        BlurRadius::new(value)
    }
}

impl TryFrom<f32> for BlurRadius {
    type Error = BlurError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        BlurRadius::from_f32(value)
    }
}

impl TryFrom<i32> for BlurRadius {
    type Error = BlurError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(BlurRadius::new)
            .map_err(|_| ArgumentError::NegativeRadius.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_parsing() {
        assert_eq!(BlurRadius::from_f32(0.).unwrap().get(), 0);
        assert_eq!(BlurRadius::from_f32(3.9).unwrap().get(), 3);
        assert_eq!(BlurRadius::from_f32(1000.).unwrap().get(), MAX_RADIUS);
        assert_eq!(
            BlurRadius::from_f32(-1.),
            Err(BlurError::InvalidArgument(ArgumentError::NegativeRadius))
        );
        assert_eq!(
            BlurRadius::from_f32(f32::NAN),
            Err(BlurError::InvalidArgument(ArgumentError::NonFiniteRadius))
        );
        assert_eq!(
            BlurRadius::try_from(-1i32),
            Err(BlurError::InvalidArgument(ArgumentError::NegativeRadius))
        );
        assert!(BlurRadius::from(0u32).is_identity());
    }
}
