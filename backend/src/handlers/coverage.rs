use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    handlers::parse_id,
    models::{coverage::CoverageSnapshot, date_range::DateRange},
    state::AppState,
    types::TeamId,
    utils::time,
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CoverageQuery {
    /// Single day to report; defaults to today in the configured timezone.
    pub date: Option<NaiveDate>,
    /// Start of a range; must be paired with `to`.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Team headcount the percentages are computed against.
    pub roster_size: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoverageResponse {
    pub team_id: String,
    pub days: Vec<CoverageSnapshot>,
}

pub async fn get_team_coverage(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Query(query): Query<CoverageQuery>,
) -> Result<Json<CoverageResponse>, AppError> {
    let team_id: TeamId = parse_id("team id", &team_id)?;
    let range = coverage_window(&query, time::today_local(&state.config.time_zone))?;
    let days = state
        .ledger
        .team_coverage(team_id, range, query.roster_size)
        .await?;
    Ok(Json(CoverageResponse {
        team_id: team_id.to_string(),
        days,
    }))
}

fn coverage_window(query: &CoverageQuery, today: NaiveDate) -> Result<DateRange, AppError> {
    match (query.date, query.from, query.to) {
        (Some(date), None, None) => Ok(DateRange::single(date)),
        (None, Some(from), Some(to)) => Ok(DateRange::new(from, to)?),
        (None, None, None) => Ok(DateRange::single(today)),
        _ => Err(AppError::BadRequest(
            "Use either date or both from and to".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(
        date: Option<NaiveDate>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> CoverageQuery {
        CoverageQuery {
            date,
            from,
            to,
            roster_size: 5,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
    }

    #[test]
    fn window_defaults_to_today() {
        let range = coverage_window(&query(None, None, None), day(14)).unwrap();
        assert_eq!(range, DateRange::single(day(14)));
    }

    #[test]
    fn window_accepts_a_full_range() {
        let range = coverage_window(&query(None, Some(day(1)), Some(day(7))), day(14)).unwrap();
        assert_eq!(range.len_days(), 7);
    }

    #[test]
    fn window_rejects_mixed_or_partial_input() {
        assert!(coverage_window(&query(Some(day(1)), Some(day(1)), None), day(14)).is_err());
        assert!(coverage_window(&query(None, Some(day(1)), None), day(14)).is_err());
        assert!(coverage_window(&query(None, Some(day(7)), Some(day(1))), day(14)).is_err());
    }
}
