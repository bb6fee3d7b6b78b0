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

//! User confirmation for installs.

use crate::shared::error::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect};

pub trait Prompter: Send + Sync {
    /// Yes/no question. `true` means go ahead.
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Pick any subset of `items`. Returns the chosen indices in ascending
    /// order.
    fn select_multi(&self, prompt: &str, items: &[String], preselected: &[bool])
        -> Result<Vec<usize>>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(answer)
    }

    fn select_multi(
        &self,
        prompt: &str,
        items: &[String],
        preselected: &[bool],
    ) -> Result<Vec<usize>> {
        let mut chosen = MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .defaults(preselected)
            .interact()?;
        chosen.sort_unstable();
        Ok(chosen)
    }
}

/// Answers yes to everything and keeps every preselected item. Used when
/// nobody is at the keyboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoAccept;

impl Prompter for AutoAccept {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }

    fn select_multi(
        &self,
        _prompt: &str,
        items: &[String],
        preselected: &[bool],
    ) -> Result<Vec<usize>> {
        Ok((0..items.len())
            .filter(|&i| preselected.get(i).copied().unwrap_or(false))
            .collect())
    }
}
