//! Assembly code lookup tables.
//!
//! Each construction category has a read-only table mapping construction
//! codes (`ewwf13vi`, `rfps11co`, `ecwf30`, ...) to their effective
//! R-value. Tables are loaded once and passed by reference into the
//! resolver; nothing here is mutated after loading.

use crate::error::{TranslateError, TranslateResult};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Construction category a table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construction {
    Wall,
    Roof,
    Ceiling,
    Floor,
    KneeWall,
}

impl Construction {
    pub const ALL: [Construction; 5] = [
        Construction::Wall,
        Construction::Roof,
        Construction::Ceiling,
        Construction::Floor,
        Construction::KneeWall,
    ];

    /// Key used in table file names and table bundles.
    pub fn key(&self) -> &'static str {
        match self {
            Construction::Wall => "wall",
            Construction::Roof => "roof",
            Construction::Ceiling => "ceiling",
            Construction::Floor => "floor",
            Construction::KneeWall => "knee_wall",
        }
    }

    /// Two-letter prefix of the category's codes.
    pub fn prefix(&self) -> &'static str {
        match self {
            Construction::Wall => "ew",
            Construction::Roof => "rf",
            Construction::Ceiling => "ec",
            Construction::Floor => "ef",
            Construction::KneeWall => "kw",
        }
    }

    pub fn file_name(&self) -> String {
        format!("lu_{}_eff_rvalue.csv", self.key())
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Construction::KneeWall => "knee wall",
            other => other.key(),
        };
        f.write_str(label)
    }
}

/// Construction subtype token (characters 2..4), e.g. `wf`, `ps`, `br`.
pub fn code_subtype(code: &str) -> &str {
    code.get(2..4).unwrap_or("")
}

/// Nominal R-value embedded in a code (characters 4..6).
pub fn code_nominal(code: &str) -> Option<u32> {
    code.get(4..6).and_then(|digits| digits.parse().ok())
}

/// Finish token (characters 6..8): siding for walls, roofing for roofs.
pub fn code_finish(code: &str) -> &str {
    code.get(6..8).unwrap_or("")
}

/// Ordered `(code, effective R-value)` entries for one category.
///
/// Iteration order is file order and breaks nearest-match ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyCodeTable {
    entries: Vec<(String, f64)>,
}

impl AssemblyCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (code, rvalue) in entries {
            table.insert(code, rvalue);
        }
        table
    }

    /// Insert or replace an entry; a replaced entry keeps its position.
    pub fn insert(&mut self, code: impl Into<String>, rvalue: f64) {
        let code = code.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = rvalue,
            None => self.entries.push((code, rvalue)),
        }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, r)| *r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, r)| (c.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry whose R-value is closest to `rvalue` among those passing
    /// `filter`. The first entry wins a tie.
    pub fn nearest<F>(&self, rvalue: f64, filter: F) -> Option<(&str, f64)>
    where
        F: Fn(&str) -> bool,
    {
        self.iter()
            .filter(|(code, _)| filter(code))
            .min_by(|a, b| (a.1 - rvalue).abs().total_cmp(&(b.1 - rvalue).abs()))
    }

    /// Entry whose embedded nominal R-value is closest to `nominal`.
    pub fn nearest_by_nominal(&self, nominal: f64) -> Option<(&str, f64)> {
        self.iter()
            .filter_map(|(code, r)| code_nominal(code).map(|n| (code, r, n)))
            .min_by(|a, b| {
                (a.2 as f64 - nominal)
                    .abs()
                    .total_cmp(&(b.2 as f64 - nominal).abs())
            })
            .map(|(code, r, _)| (code, r))
    }

    /// Parse a lookup CSV with `doe2code` and `Eff-R-value` header columns.
    pub fn from_csv_str(text: &str) -> TranslateResult<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| TranslateError::Table("empty lookup table".into()))?;
        let columns: Vec<&str> = header.split(',').map(unquote).collect();
        let column = |name: &str| {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| TranslateError::Table(format!("missing column {}", name)))
        };
        let code_col = column("doe2code")?;
        let rvalue_col = column("Eff-R-value")?;

        let mut table = Self::new();
        for (lineno, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split(',').map(unquote).collect();
            let (Some(code), Some(raw)) = (fields.get(code_col), fields.get(rvalue_col)) else {
                return Err(TranslateError::Table(format!(
                    "row {} has too few columns",
                    lineno + 2
                )));
            };
            let rvalue = raw.parse::<f64>().map_err(|_| {
                TranslateError::Table(format!("row {}: invalid R-value \"{}\"", lineno + 2, raw))
            })?;
            table.insert(*code, rvalue);
        }
        Ok(table)
    }

    fn from_json(value: &Value, key: &str) -> TranslateResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| TranslateError::Table(format!("{} table must be a mapping", key)))?;
        let mut table = Self::new();
        for (code, rvalue) in map {
            let r = rvalue.as_f64().ok_or_else(|| {
                TranslateError::Table(format!("{} table: {} is not a number", key, code))
            })?;
            table.insert(code.as_str(), r);
        }
        Ok(table)
    }
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches('"')
}

/// The five category tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyTables {
    pub wall: AssemblyCodeTable,
    pub roof: AssemblyCodeTable,
    pub ceiling: AssemblyCodeTable,
    pub floor: AssemblyCodeTable,
    pub knee_wall: AssemblyCodeTable,
}

impl AssemblyTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, construction: Construction, table: AssemblyCodeTable) -> Self {
        *self.table_mut(construction) = table;
        self
    }

    pub fn table(&self, construction: Construction) -> &AssemblyCodeTable {
        match construction {
            Construction::Wall => &self.wall,
            Construction::Roof => &self.roof,
            Construction::Ceiling => &self.ceiling,
            Construction::Floor => &self.floor,
            Construction::KneeWall => &self.knee_wall,
        }
    }

    fn table_mut(&mut self, construction: Construction) -> &mut AssemblyCodeTable {
        match construction {
            Construction::Wall => &mut self.wall,
            Construction::Roof => &mut self.roof,
            Construction::Ceiling => &mut self.ceiling,
            Construction::Floor => &mut self.floor,
            Construction::KneeWall => &mut self.knee_wall,
        }
    }

    /// Load from a directory of `lu_<category>_eff_rvalue.csv` files or
    /// from a single JSON/YAML bundle file.
    pub fn load(path: &Path) -> TranslateResult<Self> {
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_bundle_file(path)
        }
    }

    pub fn from_dir(dir: &Path) -> TranslateResult<Self> {
        let mut tables = Self::new();
        for construction in Construction::ALL {
            let file = dir.join(construction.file_name());
            let text = std::fs::read_to_string(&file).map_err(|e| {
                TranslateError::Table(format!("cannot read {}: {}", file.display(), e))
            })?;
            *tables.table_mut(construction) = AssemblyCodeTable::from_csv_str(&text)?;
        }
        tracing::debug!(dir = %dir.display(), "loaded assembly tables");
        Ok(tables)
    }

    pub fn from_bundle_file(path: &Path) -> TranslateResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let value: Value = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
            _ => serde_json::from_str(&text)?,
        };
        Self::from_bundle(&value)
    }

    /// `{ "wall": {code: r, ...}, "roof": ..., ... }`; missing categories
    /// load as empty tables.
    pub fn from_bundle(value: &Value) -> TranslateResult<Self> {
        let mut tables = Self::new();
        for construction in Construction::ALL {
            if let Some(section) = value.get(construction.key()) {
                *tables.table_mut(construction) =
                    AssemblyCodeTable::from_json(section, construction.key())?;
            }
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_tokens() {
        assert_eq!(code_subtype("ewwf13vi"), "wf");
        assert_eq!(code_nominal("ewwf13vi"), Some(13));
        assert_eq!(code_finish("ewwf13vi"), "vi");
        assert_eq!(code_finish("ecwf30"), "");
        assert_eq!(code_nominal("kwwf00"), Some(0));
    }

    #[test]
    fn nearest_respects_filter_and_tie_order() {
        let table = AssemblyCodeTable::from_entries([
            ("ewwf11wo", 10.0),
            ("ewps07wo", 12.0),
            ("ewwf13vi", 12.0),
            ("ewwf13wo", 12.0),
        ]);
        let (code, r) = table.nearest(11.9, |c| code_finish(c) == "wo").unwrap();
        assert_eq!((code, r), ("ewps07wo", 12.0));
        let (code, _) = table.nearest(11.0, |c| code_subtype(c) == "wf").unwrap();
        assert_eq!(code, "ewwf11wo");
        assert!(table.nearest(1.0, |c| c.starts_with("rf")).is_none());
    }

    #[test]
    fn nearest_by_nominal_uses_code_digits() {
        let table = AssemblyCodeTable::from_entries([("kwwf00", 2.0), ("kwwf11", 9.5), ("kwwf19", 13.8)]);
        assert_eq!(table.nearest_by_nominal(14.0).unwrap().0, "kwwf11");
        assert_eq!(table.nearest_by_nominal(16.0).unwrap().0, "kwwf19");
    }

    #[test]
    fn csv_loading() {
        let table = AssemblyCodeTable::from_csv_str(
            "doe2code,U-value,Eff-R-value\newwf00wo,0.25,4.0\n\"ewwf13wo\",0.08,12.5\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("ewwf13wo"), Some(12.5));
    }

    #[test]
    fn csv_without_rvalue_column_fails() {
        assert!(AssemblyCodeTable::from_csv_str("doe2code,U-value\newwf00wo,0.25\n").is_err());
    }

    #[test]
    fn directory_loading() {
        let dir = tempfile::tempdir().unwrap();
        for construction in Construction::ALL {
            let code = format!("{}wf00", construction.prefix());
            std::fs::write(
                dir.path().join(construction.file_name()),
                format!("doe2code,Eff-R-value\n{},3.0\n", code),
            )
            .unwrap();
        }
        let tables = AssemblyTables::load(dir.path()).unwrap();
        assert_eq!(tables.knee_wall.get("kwwf00"), Some(3.0));
        assert_eq!(tables.table(Construction::Roof).len(), 1);
    }

    #[test]
    fn bundle_loading_keeps_order() {
        let tables = AssemblyTables::from_bundle(&json!({
            "ceiling": {"ecwf00": 2.2, "ecwf11": 10.5},
            "floor": {"efwf00ca": 4.0}
        }))
        .unwrap();
        let codes: Vec<&str> = tables.ceiling.iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["ecwf00", "ecwf11"]);
        assert!(tables.wall.is_empty());
    }
}
