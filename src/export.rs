use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use tokio::task;

pub const SOURCE_DATASET: &str = "holzeinschlag_austria.gpkg";
const EXPORT_BASENAME: &str = "holzeinschlag_austria";
const SOURCE_LAYER: &str = "gemeinden";

const BASE_COLUMNS: [&str; 6] = ["fid", "geom", "name", "iso", "state", "population"];
const YEAR_COLUMN_PREFIXES: [&str; 7] = [
    "loss_pixels",
    "loss_area_ha",
    "harvest_efm",
    "value_eur",
    "co2_tonnes",
    "ets_eur",
    "ets_per_capita",
];

/// Caller-supplied restriction on the generated dataset copy. Empty vectors
/// mean "no filter on this dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub years: Vec<String>,
    pub regions: Vec<String>,
}

impl ExportFilter {
    /// Parse the comma-separated query parameters, trimming each token.
    /// The tokens end up inside a SQL statement, so anything outside the
    /// identifier alphabet is rejected before any interpolation happens.
    pub fn parse(years: Option<&str>, regions: Option<&str>) -> Result<Self> {
        let years = split_tokens(years);
        let regions = split_tokens(regions);

        for token in years.iter().chain(regions.iter()) {
            if !is_identifier(token) {
                bail!("filter token {token:?} is not a valid identifier");
            }
        }

        Ok(Self { years, regions })
    }

    /// The SELECT statement handed to the conversion tool. With no year
    /// filter every column survives; otherwise the fixed base columns plus
    /// the seven derived columns per requested year.
    pub fn sql(&self) -> String {
        let columns = if self.years.is_empty() {
            "*".to_string()
        } else {
            let mut columns: Vec<String> =
                BASE_COLUMNS.iter().map(|column| column.to_string()).collect();
            for year in &self.years {
                for prefix in YEAR_COLUMN_PREFIXES {
                    columns.push(format!("{prefix}_{year}"));
                }
            }
            columns.join(", ")
        };

        let mut sql = format!("SELECT {columns} FROM {SOURCE_LAYER}");
        if !self.regions.is_empty() {
            let quoted: Vec<String> = self
                .regions
                .iter()
                .map(|region| format!("'{region}'"))
                .collect();
            sql.push_str(&format!(" WHERE iso IN ({})", quoted.join(",")));
        }
        sql
    }

    /// Download filename reflecting which filters were applied.
    pub fn filename(&self) -> String {
        let mut name = EXPORT_BASENAME.to_string();
        if !self.regions.is_empty() {
            name.push_str("_selection");
        }
        if !self.years.is_empty() {
            name.push('_');
            name.push_str(&self.years.join("-"));
        }
        name.push_str(".gpkg");
        name
    }
}

#[derive(Debug)]
pub struct ExportPayload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Materialize a filtered copy of the source dataset through ogr2ogr and
/// return it fully in memory. Each call works in its own scratch directory,
/// so concurrent exports never collide.
pub async fn build_export(source: PathBuf, filter: ExportFilter) -> Result<ExportPayload> {
    let filename = filter.filename();
    let sql = filter.sql();

    let result = task::spawn_blocking(move || run_ogr2ogr(&source, &sql, &env::temp_dir()))
        .await
        .context("export task failed")?;
    let bytes = result?;

    Ok(ExportPayload { filename, bytes })
}

fn run_ogr2ogr(source: &Path, sql: &str, scratch_root: &Path) -> Result<Vec<u8>> {
    // The scratch directory is removed when `workdir` drops, on every exit
    // path of this function.
    let workdir = tempfile::Builder::new()
        .prefix("export_")
        .tempdir_in(scratch_root)
        .context("failed to create export scratch directory")?;
    let output_path = workdir.path().join("export.gpkg");

    let output = Command::new("ogr2ogr")
        .args(["-f", "GPKG"])
        .arg(&output_path)
        .arg(source)
        .args(["-sql", sql, "-nln", SOURCE_LAYER])
        .output()
        .context("failed to execute ogr2ogr")?;

    if !output.status.success() {
        bail!(
            "ogr2ogr exited with status {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let bytes = fs::read(&output_path).context("failed to read export output")?;
    Ok(bytes)
}

fn split_tokens(param: Option<&str>) -> Vec<String> {
    param
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn year_filter_selects_base_plus_derived_columns() {
        let filter = ExportFilter::parse(Some("2021,2022"), Some("AT-1")).expect("parse filter");
        let sql = filter.sql();

        for column in BASE_COLUMNS {
            assert!(sql.contains(column), "missing base column {column}");
        }
        for prefix in YEAR_COLUMN_PREFIXES {
            assert!(sql.contains(&format!("{prefix}_2021")));
            assert!(sql.contains(&format!("{prefix}_2022")));
        }
        // 6 base + 7 derived per year.
        let selected = sql
            .strip_prefix("SELECT ")
            .and_then(|rest| rest.split_once(" FROM "))
            .expect("well-formed statement")
            .0;
        assert_eq!(selected.split(", ").count(), 6 + 14);
        assert!(sql.ends_with("WHERE iso IN ('AT-1')"));
    }

    #[test]
    fn empty_filter_selects_everything_without_predicate() {
        let filter = ExportFilter::parse(None, None).expect("parse filter");
        assert_eq!(filter.sql(), "SELECT * FROM gemeinden");
    }

    #[test]
    fn region_tokens_are_trimmed_and_kept_case_sensitive() {
        let filter = ExportFilter::parse(None, Some(" AT-1 , at-2 ,")).expect("parse filter");
        assert_eq!(
            filter.sql(),
            "SELECT * FROM gemeinden WHERE iso IN ('AT-1','at-2')"
        );
    }

    #[test]
    fn injection_shaped_tokens_are_rejected() {
        assert!(ExportFilter::parse(None, Some("AT-1'; DROP TABLE gemeinden;--")).is_err());
        assert!(ExportFilter::parse(Some("2021 OR 1=1"), None).is_err());
        assert!(ExportFilter::parse(Some("2021"), Some("AT 1")).is_err());
    }

    #[test]
    fn filename_reflects_applied_filters() {
        let none = ExportFilter::default();
        assert_eq!(none.filename(), "holzeinschlag_austria.gpkg");

        let regions = ExportFilter::parse(None, Some("AT-1")).expect("parse filter");
        assert_eq!(regions.filename(), "holzeinschlag_austria_selection.gpkg");

        let years = ExportFilter::parse(Some("2021,2022"), None).expect("parse filter");
        assert_eq!(years.filename(), "holzeinschlag_austria_2021-2022.gpkg");

        let both = ExportFilter::parse(Some("2023"), Some("AT-1")).expect("parse filter");
        assert_eq!(both.filename(), "holzeinschlag_austria_selection_2023.gpkg");
    }

    #[test]
    fn failed_conversion_leaves_no_scratch_directory_behind() {
        let scratch = tempdir().expect("scratch root");
        let missing_source = scratch.path().join("missing.gpkg");

        let result = run_ogr2ogr(&missing_source, "SELECT * FROM gemeinden", scratch.path());
        assert!(result.is_err());

        let leftovers = fs::read_dir(scratch.path())
            .expect("read scratch root")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "missing.gpkg")
            .count();
        assert_eq!(leftovers, 0);
    }
}
