// Copyright 2024 Google LLC
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

use crate::proto;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSize {
    Small,
    Normal,
    Large,
    Xlarge
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Port,
    Land,
    Square
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightMode {
    Night,
    NotNight
}

/// Density is stored in dots-per-inch; the two markers below stand in for
/// the non-numeric qualifiers.
pub const DENSITY_NONE: u32 = 0xFFFF;
pub const DENSITY_ANY: u32 = 0xFFFE;

/// Parsed form of a resource directory qualifier segment such as
/// `fr-rFR-sw600dp-land-night-xhdpi-v21`. A default-constructed value means
/// "no qualifiers", the configuration every unqualified directory gets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDescription {
    pub language: Option<String>,
    pub region: Option<String>,
    pub layout_direction: Option<Direction>,
    pub smallest_width_dp: Option<u32>,
    pub screen_width_dp: Option<u32>,
    pub screen_height_dp: Option<u32>,
    pub screen_size: Option<ScreenSize>,
    pub orientation: Option<Orientation>,
    pub night_mode: Option<NightMode>,
    pub density: Option<u32>,
    pub sdk_version: Option<u32>
}

// Qualifiers must appear in this fixed order; each class at most once. The
// parser walks the stages forward and rejects any token no remaining stage
// accepts.
const STAGE_COUNT: usize = 11;

impl ConfigDescription {
    /// Parses a qualifier segment. `None` means the segment is not a valid
    /// configuration; an empty segment is the default configuration.
    pub fn parse(config_str: &str) -> Option<ConfigDescription> {
        let mut config = ConfigDescription::default();
        if config_str.is_empty() {
            return Some(config);
        }

        let mut stage = 0;
        for part in config_str.split('-') {
            let mut matched = false;
            while stage < STAGE_COUNT {
                if try_stage(&mut config, stage, part) {
                    matched = true;
                    stage += 1;
                    break;
                }
                stage += 1;
            }
            if !matched {
                return None;
            }
        }
        Some(config)
    }

    /// Locale in `language-REGION` form, or an empty string when unset.
    pub fn locale(&self) -> String {
        match (&self.language, &self.region) {
            (Some(lang), Some(region)) => format!("{lang}-{region}"),
            (Some(lang), None) => lang.clone(),
            _ => String::new()
        }
    }

    /// Configuration differing from the default only by locale. Used when
    /// synthesizing pseudo-locale table entries.
    pub fn for_locale(language: &str, region: &str) -> ConfigDescription {
        ConfigDescription {
            language: Some(language.to_string()),
            region: Some(region.to_string()),
            ..ConfigDescription::default()
        }
    }

    pub fn is_default(&self) -> bool {
        *self == ConfigDescription::default()
    }

    pub fn to_proto(&self) -> proto::Configuration {
        proto::Configuration {
            locale: self.locale(),
            density: self.density.unwrap_or(0),
            sdk_version: self.sdk_version.unwrap_or(0),
            smallest_screen_width_dp: self.smallest_width_dp.unwrap_or(0),
            screen_width_dp: self.screen_width_dp.unwrap_or(0),
            screen_height_dp: self.screen_height_dp.unwrap_or(0),
            layout_direction: match self.layout_direction {
                Some(Direction::Ltr) => proto::LayoutDirection::Ldltr as i32,
                Some(Direction::Rtl) => proto::LayoutDirection::Ldrtl as i32,
                None => proto::LayoutDirection::UnsetLayoutDirection as i32
            },
            screen_layout_size: match self.screen_size {
                Some(ScreenSize::Small) => proto::ScreenLayoutSize::Small as i32,
                Some(ScreenSize::Normal) => proto::ScreenLayoutSize::Normal as i32,
                Some(ScreenSize::Large) => proto::ScreenLayoutSize::Large as i32,
                Some(ScreenSize::Xlarge) => proto::ScreenLayoutSize::Xlarge as i32,
                None => proto::ScreenLayoutSize::UnsetScreenLayoutSize as i32
            },
            orientation: match self.orientation {
                Some(Orientation::Port) => proto::Orientation::Port as i32,
                Some(Orientation::Land) => proto::Orientation::Land as i32,
                Some(Orientation::Square) => proto::Orientation::Square as i32,
                None => proto::Orientation::UnsetOrientation as i32
            },
            ui_mode_night: match self.night_mode {
                Some(NightMode::Night) => proto::UiModeNight::Night as i32,
                Some(NightMode::NotNight) => proto::UiModeNight::NotNight as i32,
                None => proto::UiModeNight::UnsetUiModeNight as i32
            }
        }
    }
}

fn try_stage(config: &mut ConfigDescription, stage: usize, part: &str) -> bool {
    match stage {
        0 => parse_language(config, part),
        1 => parse_region(config, part),
        2 => match part {
            "ldltr" => set(&mut config.layout_direction, Direction::Ltr),
            "ldrtl" => set(&mut config.layout_direction, Direction::Rtl),
            _ => false
        },
        3 => parse_dp(part, "sw").map_or(false, |dp| set(&mut config.smallest_width_dp, dp)),
        4 => parse_dp(part, "w").map_or(false, |dp| set(&mut config.screen_width_dp, dp)),
        5 => parse_dp(part, "h").map_or(false, |dp| set(&mut config.screen_height_dp, dp)),
        6 => match part {
            "small" => set(&mut config.screen_size, ScreenSize::Small),
            "normal" => set(&mut config.screen_size, ScreenSize::Normal),
            "large" => set(&mut config.screen_size, ScreenSize::Large),
            "xlarge" => set(&mut config.screen_size, ScreenSize::Xlarge),
            _ => false
        },
        7 => match part {
            "port" => set(&mut config.orientation, Orientation::Port),
            "land" => set(&mut config.orientation, Orientation::Land),
            "square" => set(&mut config.orientation, Orientation::Square),
            _ => false
        },
        8 => match part {
            "night" => set(&mut config.night_mode, NightMode::Night),
            "notnight" => set(&mut config.night_mode, NightMode::NotNight),
            _ => false
        },
        9 => parse_density(part).map_or(false, |dpi| set(&mut config.density, dpi)),
        10 => part
            .strip_prefix('v')
            .and_then(|v| v.parse::<u32>().ok())
            .map_or(false, |v| set(&mut config.sdk_version, v)),
        _ => false
    }
}

fn set<T>(slot: &mut Option<T>, value: T) -> bool {
    *slot = Some(value);
    true
}

fn parse_language(config: &mut ConfigDescription, part: &str) -> bool {
    let is_language = (part.len() == 2 || part.len() == 3)
        && part.chars().all(|c| c.is_ascii_lowercase());
    if !is_language {
        return false;
    }
    config.language = Some(part.to_string());
    true
}

fn parse_region(config: &mut ConfigDescription, part: &str) -> bool {
    // rUS style; the platform also allows 3-digit UN M.49 area codes.
    let Some(code) = part.strip_prefix('r') else {
        return false;
    };
    let is_region = (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
        || (code.len() == 3 && code.chars().all(|c| c.is_ascii_digit()));
    if !is_region {
        return false;
    }
    config.region = Some(code.to_ascii_uppercase());
    true
}

fn parse_dp(part: &str, prefix: &str) -> Option<u32> {
    part.strip_prefix(prefix)?
        .strip_suffix("dp")?
        .parse::<u32>()
        .ok()
}

fn parse_density(part: &str) -> Option<u32> {
    match part {
        "ldpi" => Some(120),
        "mdpi" => Some(160),
        "tvdpi" => Some(213),
        "hdpi" => Some(240),
        "xhdpi" => Some(320),
        "xxhdpi" => Some(480),
        "xxxhdpi" => Some(640),
        "nodpi" => Some(DENSITY_NONE),
        "anydpi" => Some(DENSITY_ANY),
        _ => part.strip_suffix("dpi")?.parse::<u32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_segment_is_default() {
        let config = ConfigDescription::parse("").unwrap();
        assert!(config.is_default());
    }

    #[test]
    fn single_qualifiers() {
        assert_eq!(ConfigDescription::parse("hdpi").unwrap().density, Some(240));
        assert_eq!(
            ConfigDescription::parse("fr").unwrap().language,
            Some("fr".to_string())
        );
        assert_eq!(
            ConfigDescription::parse("v21").unwrap().sdk_version,
            Some(21)
        );
        assert_eq!(
            ConfigDescription::parse("480dpi").unwrap().density,
            Some(480)
        );
    }

    #[test]
    fn locale_with_region() {
        let config = ConfigDescription::parse("fr-rFR").unwrap();
        assert_eq!(config.locale(), "fr-FR");
    }

    #[test]
    fn qualifier_chain_in_order() {
        let config = ConfigDescription::parse("en-rGB-sw600dp-land-night-xhdpi-v19").unwrap();
        assert_eq!(config.language, Some("en".to_string()));
        assert_eq!(config.smallest_width_dp, Some(600));
        assert_eq!(config.orientation, Some(Orientation::Land));
        assert_eq!(config.night_mode, Some(NightMode::Night));
        assert_eq!(config.density, Some(320));
        assert_eq!(config.sdk_version, Some(19));
    }

    #[test]
    fn out_of_order_and_unknown_rejected() {
        // Density cannot precede orientation.
        assert_eq!(ConfigDescription::parse("hdpi-land"), None);
        assert_eq!(ConfigDescription::parse("notaqualifier"), None);
        assert_eq!(ConfigDescription::parse("fr-fr"), None);
    }

    #[test]
    fn proto_round_trip_of_key_fields() {
        let config = ConfigDescription::parse("en-rXA-night").unwrap();
        let pb = config.to_proto();
        assert_eq!(pb.locale, "en-XA");
        assert_eq!(pb.ui_mode_night, proto::UiModeNight::Night as i32);
        assert_eq!(pb.density, 0);
    }
}
