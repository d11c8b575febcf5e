// Copyright 2024-2025 the apigee-edge contributors
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

use std::path::PathBuf;

use reqwest::Method;
use url::Url;

/// Error type shared by every operation of the client.
///
/// The variants form a closed taxonomy that callers can match on instead of
/// inspecting message strings. Server-provided messages are carried verbatim.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// The addressed resource or revision does not exist.
    #[error("{operation}: {resource} not found: {message}")]
    NotFound {
        operation: &'static str,
        resource: String,
        message: String,
    },

    /// The server refused the operation because of conflicting state, most
    /// commonly a delete attempted while a revision is still deployed, or a
    /// deploy rejected over a basepath collision.
    #[error("{operation}: {resource} rejected: {message}")]
    Conflict {
        operation: &'static str,
        resource: String,
        message: String,
    },

    /// A client-side precondition failed, such as a missing required field.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The input or response payload has the wrong shape, e.g. a non-archive
    /// import source or a malformed response body.
    #[error("{0}")]
    Format(String),

    /// Local I/O failed while packaging or exporting a bundle.
    #[error("i/o failure on {}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP exchange itself failed, or the server answered with a status
    /// that maps to no more specific category.
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
    },
}

impl EdgeError {
    pub(crate) fn transport(method: &Method, url: &Url, err: reqwest::Error) -> Self {
        EdgeError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EdgeError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for EdgeError {
    fn from(err: reqwest::Error) -> Self {
        EdgeError::Transport {
            method: "request".to_string(),
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
