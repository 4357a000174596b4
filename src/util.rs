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
use std::error::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

/// Reason a request was rejected before any work was dispatched.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArgumentError {
    ZeroBaseSize,
    MinimumSliceSizeMismatch(MismatchedSize),
    MinimumStrideSizeMismatch(MismatchedSize),
    ImagesMustMatch,
    NegativeRadius,
    NonFiniteRadius,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlurError {
    /// Programmer error, always raised synchronously before dispatch.
    InvalidArgument(ArgumentError),
    /// The call was cancelled; the output buffer content is undefined.
    Interrupted,
    /// Accelerator construction or launch failed, or a worker aborted.
    Fatal(String),
}

/// Failure reported by an [`AcceleratorContext`](crate::AcceleratorContext) or
/// [`ComputeDevice`](crate::ComputeDevice).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AcceleratorError {
    /// The accelerator cannot run on this hardware. Recorded once per process and
    /// answered by a permanent fallback.
    Unsupported(String),
    /// Any other failure.
    Failure(String),
}

impl Error for ArgumentError {}

impl std::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ArgumentError::ZeroBaseSize => f.write_str("Image size must not be zero"),
            ArgumentError::MinimumSliceSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum image slice size mismatch: expected={}, received={}",
                size.expected, size.received
            )),
            ArgumentError::MinimumStrideSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum stride must have size at least {} but it is {}",
                size.expected, size.received
            )),
            ArgumentError::ImagesMustMatch => {
                f.write_str("Source and destination images must match in their dimensions")
            }
            ArgumentError::NegativeRadius => f.write_str("Radius must not be negative"),
            ArgumentError::NonFiniteRadius => f.write_str("Radius must be a finite number"),
        }
    }
}

impl Error for BlurError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BlurError::InvalidArgument(argument) => Some(argument),
            _ => None,
        }
    }
}

impl std::fmt::Display for BlurError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BlurError::InvalidArgument(argument) => {
                f.write_fmt(format_args!("Invalid argument: {argument}"))
            }
            BlurError::Interrupted => f.write_str("Blur was interrupted before completion"),
            BlurError::Fatal(message) => f.write_fmt(format_args!("Fatal blur error: {message}")),
        }
    }
}

impl From<ArgumentError> for BlurError {
    fn from(value: ArgumentError) -> Self {
        BlurError::InvalidArgument(value)
    }
}

impl Error for AcceleratorError {}

impl std::fmt::Display for AcceleratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AcceleratorError::Unsupported(reason) => {
                f.write_fmt(format_args!("Accelerator is not supported: {reason}"))
            }
            AcceleratorError::Failure(reason) => {
                f.write_fmt(format_args!("Accelerator failure: {reason}"))
            }
        }
    }
}

pub(crate) fn check_slice_size(
    len: usize,
    stride: usize,
    width: usize,
    height: usize,
) -> Result<(), ArgumentError> {
    if width == 0 || height == 0 {
        return Err(ArgumentError::ZeroBaseSize);
    }
    if stride < width {
        return Err(ArgumentError::MinimumStrideSizeMismatch(MismatchedSize {
            expected: width,
            received: stride,
        }));
    }
    if len < stride * (height - 1) + width {
        return Err(ArgumentError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: stride * height,
            received: len,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_slice_size() {
        assert_eq!(check_slice_size(16, 4, 4, 4), Ok(()));
        assert_eq!(check_slice_size(19, 5, 4, 4), Ok(()));
        assert_eq!(
            check_slice_size(18, 5, 4, 4),
            Err(ArgumentError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: 20,
                received: 18
            }))
        );
        assert_eq!(
            check_slice_size(0, 0, 0, 4),
            Err(ArgumentError::ZeroBaseSize)
        );
        assert_eq!(
            check_slice_size(12, 4, 4, 4),
            Err(ArgumentError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: 16,
                received: 12
            }))
        );
        assert_eq!(
            check_slice_size(16, 3, 4, 4),
            Err(ArgumentError::MinimumStrideSizeMismatch(MismatchedSize {
                expected: 4,
                received: 3
            }))
        );
    }

    #[test]
    fn test_invalid_argument_source() {
        let error = BlurError::from(ArgumentError::NegativeRadius);
        assert!(error.source().is_some());
        assert_eq!(
            error.to_string(),
            "Invalid argument: Radius must not be negative"
        );
    }
}
