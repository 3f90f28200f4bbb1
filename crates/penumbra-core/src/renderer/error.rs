// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the error types of the core rendering contracts.

use std::fmt;

/// An error raised by the core rendering types.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A value was outside the range an operation accepts.
    InvalidArgument {
        /// The name of the offending argument.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidArgument { name, reason } => {
                write!(f, "Invalid argument '{name}': {reason}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RenderError::InvalidArgument {
            name: "source",
            reason: "unknown depth source 7".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid argument 'source': unknown depth source 7");
    }
}
