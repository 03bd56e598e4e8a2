use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use time::Time;

/// Minutes in a full day; a window may end here to mean "until midnight".
pub const DAY_END_MIN: u16 = 24 * 60;

/// A half-open [start, end) window within one day, in minutes since
/// midnight. Minutes rather than `time::Time` so that a window closing at
/// 24:00 is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayWindow {
    pub start: u16,
    pub end: u16,
}

impl DayWindow {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn from_times(start: Time, end: Time) -> Self {
        Self {
            start: minutes_of(start),
            end: if end == Time::MIDNIGHT {
                DAY_END_MIN
            } else {
                minutes_of(end)
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.saturating_sub(self.start)
    }

    /// Half-open overlap: [a1,a2) and [b1,b2) overlap iff a1 < b2 && b1 < a2.
    pub fn overlaps(&self, other: &DayWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely inside this window.
    pub fn contains(&self, other: &DayWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersect(&self, other: &DayWindow) -> Option<DayWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(DayWindow { start, end })
    }
}

pub fn minutes_of(t: Time) -> u16 {
    t.hour() as u16 * 60 + t.minute() as u16
}

/// Sort windows and merge overlapping or touching ones, dropping empties.
pub fn normalize(mut windows: Vec<DayWindow>) -> Vec<DayWindow> {
    windows.retain(|w| !w.is_empty());
    windows.sort();
    let mut merged: Vec<DayWindow> = Vec::with_capacity(windows.len());
    for w in windows {
        match merged.last_mut() {
            Some(last) if w.start <= last.end => last.end = last.end.max(w.end),
            _ => merged.push(w),
        }
    }
    merged
}

/// Intersection of two window sets, slot by slot. Inputs need not be
/// normalized; the result is.
pub fn intersect_sets(a: &[DayWindow], b: &[DayWindow]) -> Vec<DayWindow> {
    let mut out = Vec::new();
    for wa in a {
        for wb in b {
            if let Some(w) = wa.intersect(wb) {
                out.push(w);
            }
        }
    }
    normalize(out)
}

/// Remove every busy window from the open set, splitting open windows
/// where a busy interval lands in the middle.
pub fn subtract(open: &[DayWindow], busy: &[DayWindow]) -> Vec<DayWindow> {
    let busy = normalize(busy.to_vec());
    let mut out = Vec::new();
    for w in open {
        let mut cursor = w.start;
        for b in &busy {
            if b.end <= cursor || b.start >= w.end {
                continue;
            }
            if b.start > cursor {
                out.push(DayWindow::new(cursor, b.start));
            }
            cursor = cursor.max(b.end);
            if cursor >= w.end {
                break;
            }
        }
        if cursor < w.end {
            out.push(DayWindow::new(cursor, w.end));
        }
    }
    normalize(out)
}

fn fmt_minutes(total: u16) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", fmt_minutes(self.start), fmt_minutes(self.end))
    }
}

impl Serialize for DayWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DayWindow", 2)?;
        s.serialize_field("start", &fmt_minutes(self.start))?;
        s.serialize_field("end", &fmt_minutes(self.end))?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(start: u16, end: u16) -> DayWindow {
        DayWindow::new(start, end)
    }

    #[test]
    fn overlap_is_half_open() {
        // A window ending exactly where the next begins does not overlap.
        assert!(!w(540, 600).overlaps(&w(600, 660)));
        assert!(!w(600, 660).overlaps(&w(540, 600)));
        assert!(w(540, 601).overlaps(&w(600, 660)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = w(615, 645);
        let b = w(600, 630);
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn normalize_merges_and_sorts() {
        let out = normalize(vec![w(840, 1080), w(540, 780), w(770, 800), w(100, 100)]);
        assert_eq!(out, vec![w(540, 800), w(840, 1080)]);
    }

    #[test]
    fn intersect_sets_splits_per_slot() {
        // Business 09:00-18:00 against a split shift 09:00-13:00 / 14:00-18:00.
        let business = vec![w(540, 1080)];
        let staff = vec![w(540, 780), w(840, 1080)];
        assert_eq!(
            intersect_sets(&business, &staff),
            vec![w(540, 780), w(840, 1080)]
        );
    }

    #[test]
    fn intersect_sets_empty_side_is_empty() {
        assert!(intersect_sets(&[w(540, 1080)], &[]).is_empty());
        assert!(intersect_sets(&[], &[w(540, 1080)]).is_empty());
    }

    #[test]
    fn subtract_splits_around_busy() {
        // 09:00-13:00 minus a 10:00-10:30 booking.
        let out = subtract(&[w(540, 780)], &[w(600, 630)]);
        assert_eq!(out, vec![w(540, 600), w(630, 780)]);
    }

    #[test]
    fn subtract_clips_edges() {
        let out = subtract(&[w(540, 780)], &[w(500, 560), w(760, 800)]);
        assert_eq!(out, vec![w(560, 760)]);
    }

    #[test]
    fn subtract_busy_covering_window_removes_it() {
        assert!(subtract(&[w(600, 660)], &[w(540, 720)]).is_empty());
    }

    #[test]
    fn from_times_handles_midnight_close() {
        let win = DayWindow::from_times(
            Time::from_hms(22, 0, 0).unwrap(),
            Time::MIDNIGHT,
        );
        assert_eq!(win, w(1320, DAY_END_MIN));
    }

    #[test]
    fn serializes_as_hh_mm() {
        let json = serde_json::to_value(w(540, 780)).unwrap();
        assert_eq!(json["start"], "09:00");
        assert_eq!(json["end"], "13:00");
    }
}
