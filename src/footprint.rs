// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/footprint.rs - Footprint name normalization.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

// The hand-solder pad variants confuse JLCPCB's automatic part matching.
static HAND_SOLDER_PADS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("Metric_Pad.*_HandSolder").unwrap());

/// Collapses a hand-solder pad footprint name to its base footprint name.
///
/// `R_0805_2012Metric_Pad1.20x1.40mm_HandSolder` becomes `R_0805_2012Metric`.
/// Names without the pad suffix are returned unchanged.
pub fn normalize_footprint(footprint: &str) -> Cow<'_, str> {
    HAND_SOLDER_PADS.replace_all(footprint, "Metric")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_hand_solder_suffix() {
        assert_eq!(
            normalize_footprint("Resistor_SMD:R_0805_2012Metric_Pad1.20x1.40mm_HandSolder"),
            "Resistor_SMD:R_0805_2012Metric"
        );
        assert_eq!(
            normalize_footprint("Capacitor_SMD:C_0603_1608Metric_Pad1.08x0.95mm_HandSolder"),
            "Capacitor_SMD:C_0603_1608Metric"
        );
    }

    #[test]
    fn test_other_footprints_unchanged() {
        for fp in [
            "Resistor_SMD:R_0805_2012Metric",
            "Package_TO_SOT_SMD:SOT-23",
            "Connector_PinHeader_2.54mm:PinHeader_1x04_P2.54mm_Vertical",
            "",
        ] {
            let normalized = normalize_footprint(fp);
            assert!(matches!(normalized, Cow::Borrowed(_)));
            assert_eq!(normalized, fp);
        }
    }

    #[test]
    fn test_suffix_without_pad_marker_unchanged() {
        assert_eq!(
            normalize_footprint("LED_SMD:LED_0805_2012Metric_HandSolder"),
            "LED_SMD:LED_0805_2012Metric_HandSolder"
        );
    }
}
