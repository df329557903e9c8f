//! Window and skylight construction codes and per-zone glazing summaries.

use super::plurality;
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{GlazingMethod, SkylightZone, WindowZone};
use crate::model::GlazingRecord;

/// Catalog codes by frame class, pane count and glass class.
const WINDOW_CODES: &[(&str, &str, &str, &str)] = &[
    ("Aluminum", "single-pane", "clear", "scna"),
    ("Aluminum", "single-pane", "tinted", "stna"),
    ("Aluminum", "double-pane", "clear", "dcaa"),
    ("Aluminum", "double-pane", "tinted", "dtaa"),
    ("Aluminum", "double-pane", "solar-control low-e", "dseaa"),
    ("Aluminum with Thermal Break", "double-pane", "clear", "dcab"),
    ("Aluminum with Thermal Break", "double-pane", "tinted", "dtab"),
    ("Aluminum with Thermal Break", "double-pane", "insulating low-e argon", "dpeaab"),
    ("Aluminum with Thermal Break", "double-pane", "solar-control low-e", "dseab"),
    ("Wood or Vinyl", "single-pane", "clear", "scnw"),
    ("Wood or Vinyl", "single-pane", "tinted", "stnw"),
    ("Wood or Vinyl", "double-pane", "clear", "dcaw"),
    ("Wood or Vinyl", "double-pane", "tinted", "dtaw"),
    ("Wood or Vinyl", "double-pane", "insulating low-e", "dpeaw"),
    ("Wood or Vinyl", "double-pane", "insulating low-e argon", "dpeaaw"),
    ("Wood or Vinyl", "double-pane", "solar-control low-e", "dseaw"),
    ("Wood or Vinyl", "double-pane", "solar-control low-e argon", "dseaaw"),
    ("Wood or Vinyl", "triple-pane", "insulating low-e argon", "thmabw"),
];

/// Catalog code for a window or skylight described by frame and glazing.
pub fn window_code(glazing: &GlazingRecord) -> TranslateResult<String> {
    let layers = glazing.glass_layers.as_deref();
    let glass = glazing.glass_type.as_deref();
    let gas = glazing.gas_fill.as_deref();
    let tinted = glass.map_or(false, |g| g.starts_with("tinted"));

    let (pane, mut class) = if glazing.double_pane {
        (Some("double-pane"), None)
    } else if layers == Some("single-pane") {
        let class = match glass {
            Some("tinted" | "low-e" | "tinted/reflective") => "tinted",
            _ => "clear",
        };
        (Some("single-pane"), Some(class))
    } else if layers == Some("triple-pane") {
        (Some("triple-pane"), Some("insulating low-e argon"))
    } else {
        (None, None)
    };

    // only a true double pane can be gas filled
    let argon = layers == Some("double-pane") && gas == Some("argon");

    let frame = match glazing.frame.as_deref() {
        Some("Aluminum" | "Metal") if glazing.thermal_break => {
            class = Some(if argon && glass == Some("low-e") {
                "insulating low-e argon"
            } else if matches!(glass, Some("reflective" | "low-e")) {
                "solar-control low-e"
            } else if tinted {
                "tinted"
            } else {
                "clear"
            });
            Some("Aluminum with Thermal Break")
        }
        Some("Aluminum" | "Metal") => {
            if glazing.double_pane {
                class = Some(match glass {
                    Some("reflective" | "tinted/reflective" | "low-e") => "solar-control low-e",
                    Some("tinted") => "tinted",
                    _ => "clear",
                });
            }
            Some("Aluminum")
        }
        Some("Vinyl" | "Wood" | "Fiberglass" | "Composite") => {
            if glazing.double_pane {
                let low_e = (layers == Some("double-pane") && glass == Some("low-e")) || glazing.storm_low_e;
                class = Some(match (low_e, glass == Some("reflective"), argon) {
                    (true, _, true) => "insulating low-e argon",
                    (true, _, false) => "insulating low-e",
                    (false, true, true) => "solar-control low-e argon",
                    (false, true, false) => "solar-control low-e",
                    _ if tinted => "tinted",
                    _ => "clear",
                });
            }
            Some("Wood or Vinyl")
        }
        _ => None,
    };

    WINDOW_CODES
        .iter()
        .find(|(f, p, c, _)| Some(*f) == frame && Some(*p) == pane && Some(*c) == class)
        .map(|(_, _, _, code)| code.to_string())
        .ok_or_else(|| {
            TranslateError::translation(format!(
                "There is no compatible HEScore window type for FrameType=\"{}\", GlassLayers=\"{}\", \
                 GlassType=\"{}\", GasFill=\"{}\"",
                glazing.frame.as_deref().unwrap_or("None"),
                layers.unwrap_or("None"),
                glass.unwrap_or("None"),
                gas.unwrap_or("None"),
            ))
        })
}

/// Combined glazing of one zone.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GlazingSummary {
    pub area: f64,
    pub method: GlazingMethod,
    pub code: Option<String>,
    pub u_value: Option<f64>,
    pub shgc: Option<f64>,
    pub solar_screen: bool,
}

impl GlazingSummary {
    /// Summarize `(area, record)` pieces; `None` when there are none.
    ///
    /// Pieces stating both U-factor and SHGC are area-averaged into a
    /// custom rating. Without any, the zone takes the code covering the
    /// most area.
    pub fn of(pieces: &[(f64, &GlazingRecord)]) -> TranslateResult<Option<Self>> {
        if pieces.is_empty() {
            return Ok(None);
        }
        let area: f64 = pieces.iter().map(|(a, _)| a).sum();

        let rated: Vec<(f64, f64, f64)> = pieces
            .iter()
            .filter_map(|(a, g)| Some((*a, g.u_factor?, g.shgc?)))
            .collect();

        let mut summary = Self {
            area,
            method: GlazingMethod::Code,
            code: None,
            u_value: None,
            shgc: None,
            solar_screen: plurality(pieces.iter().map(|(a, g)| (g.solar_screen, *a))).unwrap_or(false),
        };

        if rated.is_empty() {
            let codes = pieces
                .iter()
                .map(|(a, g)| Ok((window_code(g)?, *a)))
                .collect::<TranslateResult<Vec<_>>>()?;
            summary.code = plurality(codes);
        } else {
            let rated_area: f64 = rated.iter().map(|(a, _, _)| a).sum();
            summary.method = GlazingMethod::Custom;
            summary.u_value = Some(rated.iter().map(|(a, u, _)| a * u).sum::<f64>() / rated_area);
            summary.shgc = Some(rated.iter().map(|(a, _, s)| a * s).sum::<f64>() / rated_area);
        }
        Ok(Some(summary))
    }

    /// Like [`GlazingSummary::of`], but every window lacking a full rating
    /// must map to a window code, even when rated windows share its side.
    pub fn of_windows(pieces: &[(f64, &GlazingRecord)]) -> TranslateResult<Option<Self>> {
        for (_, glazing) in pieces {
            if glazing.u_factor.is_none() || glazing.shgc.is_none() {
                window_code(glazing)?;
            }
        }
        Self::of(pieces)
    }

    pub fn into_window_zone(self) -> WindowZone {
        WindowZone {
            window_area: self.area,
            window_method: self.method,
            window_code: self.code,
            window_u_value: self.u_value,
            window_shgc: self.shgc,
            solar_screen: self.solar_screen,
        }
    }

    pub fn into_skylight_zone(self) -> SkylightZone {
        SkylightZone {
            skylight_area: self.area,
            skylight_method: Some(self.method),
            skylight_code: self.code,
            skylight_u_value: self.u_value,
            skylight_shgc: self.shgc,
            solar_screen: Some(self.solar_screen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glazing(frame: &str, layers: &str, glass: Option<&str>) -> GlazingRecord {
        GlazingRecord {
            frame: Some(frame.into()),
            glass_layers: Some(layers.into()),
            glass_type: glass.map(Into::into),
            double_pane: layers == "double-pane",
            ..Default::default()
        }
    }

    #[test]
    fn codes_by_frame_and_glazing() {
        assert_eq!(window_code(&glazing("Aluminum", "single-pane", None)).unwrap(), "scna");
        assert_eq!(window_code(&glazing("Metal", "double-pane", Some("low-e"))).unwrap(), "dseaa");
        assert_eq!(window_code(&glazing("Vinyl", "single-pane", Some("tinted"))).unwrap(), "stnw");
        assert_eq!(window_code(&glazing("Wood", "triple-pane", None)).unwrap(), "thmabw");

        let mut argon = glazing("Fiberglass", "double-pane", Some("low-e"));
        argon.gas_fill = Some("argon".into());
        assert_eq!(window_code(&argon).unwrap(), "dpeaaw");

        let mut broken = glazing("Aluminum", "double-pane", Some("low-e"));
        broken.thermal_break = true;
        assert_eq!(window_code(&broken).unwrap(), "dseab");
    }

    #[test]
    fn low_e_storm_counts_as_insulating_low_e() {
        let storm = GlazingRecord {
            frame: Some("Wood".into()),
            glass_layers: Some("single-paned with low-e storms".into()),
            double_pane: true,
            storm_low_e: true,
            ..Default::default()
        };
        assert_eq!(window_code(&storm).unwrap(), "dpeaw");
    }

    #[test]
    fn unmatched_combination_names_its_inputs() {
        let err = window_code(&glazing("Aluminum", "triple-pane", None)).unwrap_err().to_string();
        assert!(err.contains("FrameType=\"Aluminum\""));
        assert!(err.contains("GasFill=\"None\""));
    }

    #[test]
    fn custom_rating_averages_rated_pieces_only() {
        let rated = GlazingRecord {
            u_factor: Some(0.3),
            shgc: Some(0.4),
            ..Default::default()
        };
        let other = glazing("Vinyl", "double-pane", None);
        let summary = GlazingSummary::of(&[(30.0, &rated), (70.0, &other)]).unwrap().unwrap();
        assert_eq!(summary.method, GlazingMethod::Custom);
        assert_eq!(summary.area, 100.0);
        assert!((summary.u_value.unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(summary.code, None);
    }

    #[test]
    fn unmapped_window_fails_beside_rated_ones() {
        let rated = GlazingRecord {
            u_factor: Some(0.3),
            shgc: Some(0.4),
            ..Default::default()
        };
        let unmapped = glazing("Aluminum", "triple-pane", None);
        let pieces = [(30.0, &rated), (20.0, &unmapped)];

        let err = GlazingSummary::of_windows(&pieces).unwrap_err();
        assert!(matches!(err, TranslateError::Translation(_)));
        assert!(err.to_string().contains("no compatible HEScore window type"));

        // skylights are only coded when none are rated
        let summary = GlazingSummary::of(&pieces).unwrap().unwrap();
        assert_eq!(summary.method, GlazingMethod::Custom);
    }

    #[test]
    fn code_method_takes_largest_area() {
        let clear = glazing("Vinyl", "double-pane", None);
        let tinted = glazing("Vinyl", "double-pane", Some("tinted"));
        let mut screened = tinted.clone();
        screened.solar_screen = true;
        let summary = GlazingSummary::of(&[(20.0, &clear), (15.0, &tinted), (10.0, &screened)])
            .unwrap()
            .unwrap();
        assert_eq!(summary.code.as_deref(), Some("dtaw"));
        assert!(!summary.solar_screen);
        assert!(GlazingSummary::of(&[]).unwrap().is_none());
    }
}
