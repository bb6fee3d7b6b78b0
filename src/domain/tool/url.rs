// Copyright 2025 JiangLong.
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

//! Rendering of descriptor URL templates.

use crate::domain::tool::descriptor::Descriptor;
use crate::domain::tool::platform::Platform;
use crate::shared::error::{Result, ToolchainError};
use tera::{Context, Tera};
use url::Url;

/// Render the download URL for `descriptor` on `platform`.
///
/// The template sees `version`, `os`, `arch` and `extension`. Anything that
/// is not an absolute URL with a host is rejected.
pub fn render(descriptor: &Descriptor, platform: &Platform) -> Result<Url> {
    let mut context = Context::new();
    context.insert("version", &descriptor.version);
    context.insert("os", platform.os.as_str());
    context.insert("arch", platform.arch.as_str());
    context.insert("extension", platform.extension());

    let rendered = Tera::one_off(&descriptor.url_template, &context, false)?;
    let rendered = rendered.trim();

    let url = Url::parse(rendered).map_err(|e| ToolchainError::url(rendered, e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(ToolchainError::url(rendered, "not an absolute URL"));
    }

    Ok(url)
}
