/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::errors::AssemblyError;
use std::collections::HashMap;

// The label table stores label names and the byte address of the
// instruction they precede.
pub type LabelTable = HashMap<String, u32>;

pub fn get_label(labels: &LabelTable, name: &str) -> Result<u32, AssemblyError> {
    labels
        .get(name)
        .copied()
        .ok_or_else(|| AssemblyError::UnknownLabel(name.to_string()))
}

/// The label with the greatest address not exceeding `address`, used by the
/// source map. None when no label precedes the address.
pub fn nearest_label(labels: &LabelTable, address: u32) -> Option<&str> {
    labels
        .iter()
        .filter(|&(_, &label_address)| label_address <= address)
        .max_by_key(|&(_, &label_address)| label_address)
        .map(|(name, _)| name.as_str())
}
