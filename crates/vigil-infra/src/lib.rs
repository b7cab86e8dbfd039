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

//! # Vigil Infra
//!
//! Concrete platform implementations of the contracts in `vigil-core`.
//!
//! Everything here talks to the operating system through `sysinfo`: the
//! process CPU clock behind the CPU load sampler and the CPU/OS
//! identification strings shown in the environment info.

#![warn(missing_docs)]

pub mod platform;

pub use platform::identity::detect_system_identity;
pub use platform::sysinfo_impl::SysinfoProcessClock;
