// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use directories::ProjectDirs;
use once_cell::sync::Lazy;

pub(crate) static CLIENT_USER_AGENT: Lazy<String> = Lazy::new(|| {
    format!(
        "{}/{}",
        option_env!("CARGO_PKG_NAME").unwrap_or("vidgate"),
        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
    )
});

pub(crate) static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("com", "NoahFontes", "Vidgate"));
