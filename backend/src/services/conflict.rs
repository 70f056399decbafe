//! Overlap and coverage calculations over approved leave.
//!
//! Everything here is pure; callers fetch the approved requests first.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    error::LedgerError,
    models::{
        coverage::{ConflictLevel, ConflictReport, CoverageSnapshot},
        date_range::DateRange,
        leave_request::LeaveRequest,
        request_status::RequestStatus,
    },
};

/// Longest range a single coverage query may span.
pub const MAX_COVERAGE_DAYS: i64 = 366;

pub fn compute_conflict_level(request: &LeaveRequest, siblings: &[LeaveRequest]) -> ConflictLevel {
    conflict_report(request, siblings).level
}

/// Approved siblings overlapping `request`, excluding the request itself.
pub fn conflict_report(request: &LeaveRequest, siblings: &[LeaveRequest]) -> ConflictReport {
    let range = request.date_range();
    let overlapping_request_ids: Vec<_> = siblings
        .iter()
        .filter(|sibling| sibling.id != request.id)
        .filter(|sibling| sibling.status == RequestStatus::Approved)
        .filter(|sibling| sibling.date_range().overlaps(&range))
        .map(|sibling| sibling.id)
        .collect();

    ConflictReport {
        request_id: request.id,
        level: ConflictLevel::from_overlap_count(overlapping_request_ids.len()),
        overlapping_count: overlapping_request_ids.len(),
        overlapping_request_ids,
    }
}

/// Team availability on `date`. An employee with several approved
/// requests covering the date is one absence.
pub fn compute_coverage(
    date: NaiveDate,
    roster_size: u32,
    approved: &[LeaveRequest],
) -> Result<CoverageSnapshot, LedgerError> {
    ensure_roster(roster_size)?;
    Ok(snapshot(date, roster_size, approved))
}

pub fn compute_coverage_range(
    range: DateRange,
    roster_size: u32,
    approved: &[LeaveRequest],
) -> Result<Vec<CoverageSnapshot>, LedgerError> {
    ensure_roster(roster_size)?;
    ensure_coverage_window(&range)?;
    Ok(range
        .iter_days()
        .map(|date| snapshot(date, roster_size, approved))
        .collect())
}

pub(crate) fn ensure_roster(roster_size: u32) -> Result<(), LedgerError> {
    if roster_size == 0 {
        return Err(LedgerError::InvalidRequest(
            "roster_size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_coverage_window(range: &DateRange) -> Result<(), LedgerError> {
    if range.len_days() > MAX_COVERAGE_DAYS {
        return Err(LedgerError::InvalidRequest(format!(
            "coverage range spans {} days, at most {MAX_COVERAGE_DAYS} allowed",
            range.len_days()
        )));
    }
    Ok(())
}

fn snapshot(date: NaiveDate, roster_size: u32, approved: &[LeaveRequest]) -> CoverageSnapshot {
    let absent: HashSet<_> = approved
        .iter()
        .filter(|request| request.status == RequestStatus::Approved)
        .filter(|request| request.date_range().contains(date))
        .map(|request| request.employee_id)
        .collect();
    let on_leave = u32::try_from(absent.len()).unwrap_or(u32::MAX);
    let available = roster_size.saturating_sub(on_leave);

    CoverageSnapshot {
        date,
        roster_size,
        on_leave,
        available,
        coverage_percentage: f64::from(available) / f64::from(roster_size) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::leave_request::CreateLeaveRequest,
        types::{EmployeeId, TeamId},
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn approved(employee_id: EmployeeId, start: u32, end: u32) -> LeaveRequest {
        let mut request = LeaveRequest::new(
            CreateLeaveRequest {
                employee_id,
                team_id: TeamId::new(),
                leave_type_id: "annual".into(),
                start_date: date(start),
                end_date: date(end),
                reason: None,
            },
            (end - start + 1) as i32,
        );
        request.status = RequestStatus::Approved;
        request
    }

    #[test]
    fn no_siblings_means_no_conflict() {
        let request = approved(EmployeeId::new(), 1, 3);
        assert_eq!(compute_conflict_level(&request, &[]), ConflictLevel::None);
    }

    #[test]
    fn request_does_not_conflict_with_itself() {
        let request = approved(EmployeeId::new(), 1, 3);
        let siblings = vec![request.clone()];
        assert_eq!(compute_conflict_level(&request, &siblings), ConflictLevel::None);
    }

    #[test]
    fn three_overlaps_is_medium_and_five_is_high() {
        let request = approved(EmployeeId::new(), 10, 12);
        let three: Vec<_> = (0..3).map(|_| approved(EmployeeId::new(), 12, 14)).collect();
        assert_eq!(compute_conflict_level(&request, &three), ConflictLevel::Medium);

        let five: Vec<_> = (0..5).map(|_| approved(EmployeeId::new(), 8, 10)).collect();
        assert_eq!(compute_conflict_level(&request, &five), ConflictLevel::High);
    }

    #[test]
    fn only_approved_and_overlapping_siblings_count() {
        let request = approved(EmployeeId::new(), 10, 12);
        let mut pending = approved(EmployeeId::new(), 10, 12);
        pending.status = RequestStatus::Pending;
        let before = approved(EmployeeId::new(), 1, 9);
        let touching = approved(EmployeeId::new(), 12, 20);

        let report = conflict_report(&request, &[pending, before, touching.clone()]);
        assert_eq!(report.level, ConflictLevel::Low);
        assert_eq!(report.overlapping_request_ids, vec![touching.id]);
    }

    #[test]
    fn coverage_counts_each_absent_employee_once() {
        let alice = EmployeeId::new();
        let requests = vec![
            approved(alice, 1, 5),
            approved(alice, 3, 4),
            approved(EmployeeId::new(), 3, 3),
        ];
        let snapshot = compute_coverage(date(3), 4, &requests).unwrap();
        assert_eq!(snapshot.on_leave, 2);
        assert_eq!(snapshot.available, 2);
        assert!((snapshot.coverage_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn available_never_goes_below_zero() {
        let requests: Vec<_> = (0..3).map(|_| approved(EmployeeId::new(), 1, 1)).collect();
        let snapshot = compute_coverage(date(1), 2, &requests).unwrap();
        assert_eq!(snapshot.available, 0);
        assert_eq!(snapshot.coverage_percentage, 0.0);
    }

    #[test]
    fn empty_roster_is_rejected() {
        let err = compute_coverage(date(1), 0, &[]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
    }

    #[test]
    fn range_yields_one_snapshot_per_day() {
        let requests = vec![approved(EmployeeId::new(), 2, 3)];
        let range = DateRange::new(date(1), date(4)).unwrap();
        let snapshots = compute_coverage_range(range, 5, &requests).unwrap();
        let on_leave: Vec<_> = snapshots.iter().map(|s| s.on_leave).collect();
        assert_eq!(on_leave, vec![0, 1, 1, 0]);
    }

    #[test]
    fn overlong_range_is_rejected() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        )
        .unwrap();
        assert!(compute_coverage_range(range, 5, &[]).is_err());
    }
}
