use crate::models::Framework;
use std::ops::RangeInclusive;

/// Scanned once a framework's preferred range is full.
pub const OVERFLOW_RANGE: RangeInclusive<u16> = 9000..=9999;

/// Returned when both the preferred and the overflow range are full. It is
/// not checked for availability.
pub const LAST_RESORT_PORT: u16 = 9999;

/// Picks a port for `framework`.
///
/// Scans the framework's preferred range in ascending order, then
/// [`OVERFLOW_RANGE`], returning the first port for which `is_taken` is
/// false. When everything is taken the result is [`LAST_RESORT_PORT`], which
/// may itself be taken; callers that record the port must check it.
pub fn find_available_port<F>(framework: &Framework, is_taken: F) -> u16
where
    F: Fn(u16) -> bool,
{
    let info = framework.info();

    info.port_range()
        .chain(OVERFLOW_RANGE)
        .find(|port| !is_taken(*port))
        .unwrap_or(LAST_RESORT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_port_of_empty_range() {
        assert_eq!(find_available_port(&Framework::NextJs, |_| false), 3000);
        assert_eq!(find_available_port(&Framework::FastApi, |_| false), 8000);
        assert_eq!(find_available_port(&Framework::Vite, |_| false), 5173);
        assert_eq!(
            find_available_port(&Framework::Unknown("elm".to_string()), |_| false),
            9000
        );
    }

    #[test]
    fn test_skips_taken_ports_in_range() {
        let taken: HashSet<u16> = [3000, 3001, 3003].into_iter().collect();
        assert_eq!(
            find_available_port(&Framework::NextJs, |p| taken.contains(&p)),
            3002
        );
    }

    #[test]
    fn test_range_end_is_inclusive() {
        let taken: HashSet<u16> = (3000..3099).collect();
        assert_eq!(
            find_available_port(&Framework::NextJs, |p| taken.contains(&p)),
            3099
        );
    }

    #[test]
    fn test_overflow_when_range_full() {
        let taken: HashSet<u16> = (8000..=8079).chain([9000]).collect();
        assert_eq!(
            find_available_port(&Framework::FastApi, |p| taken.contains(&p)),
            9001
        );
    }

    #[test]
    fn test_generic_overflow_continues_past_its_own_range() {
        let taken: HashSet<u16> = (9000..=9099).collect();
        assert_eq!(
            find_available_port(&Framework::Generic, |p| taken.contains(&p)),
            9100
        );
    }

    #[test]
    fn test_last_resort_when_everything_taken() {
        assert_eq!(find_available_port(&Framework::Flask, |_| true), LAST_RESORT_PORT);
    }
}
