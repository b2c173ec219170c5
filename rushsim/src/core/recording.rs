use crate::core::vehicle::VehicleState;
use helpers::general::argmin;
use std::mem;

/// * `elapsed_ms` - (ms) Lap time of the sealed lap
/// * `frames` - Vehicle states captured once per simulated tick, in tick order
#[derive(Debug, Clone)]
pub struct LapRecord {
    pub elapsed_ms: f64,
    pub frames: Vec<VehicleState>,
}

/// LapBook owns the per-session lap history: the in-flight recording buffer of the current lap,
/// the sealed LapRecords in lap order, and the index of the best (fastest) lap. The best-lap
/// frames double as the ghost-car trace during live racing.
#[derive(Debug, Default)]
pub struct LapBook {
    laps: Vec<LapRecord>,
    current: Vec<VehicleState>,
    best_idx: Option<usize>,
}

impl LapBook {
    pub fn new() -> LapBook {
        LapBook::default()
    }

    /// record_frame appends the just-computed vehicle state to the current lap buffer.
    pub fn record_frame(&mut self, st: VehicleState) {
        self.current.push(st);
    }

    /// current_frame_count returns the number of frames recorded for the lap in progress.
    pub fn current_frame_count(&self) -> usize {
        self.current.len()
    }

    /// discard_current drops the in-flight buffer without sealing it (race start or car reset).
    pub fn discard_current(&mut self) {
        self.current.clear();
    }

    /// seal_lap turns the current buffer into a LapRecord and starts a fresh buffer. A lap
    /// strictly faster than every earlier one becomes the new best lap.
    pub fn seal_lap(&mut self, elapsed_ms: f64) {
        let frames = mem::take(&mut self.current);
        self.laps.push(LapRecord { elapsed_ms, frames });

        let laptimes: Vec<f64> = self.laps.iter().map(|lap| lap.elapsed_ms).collect();
        self.best_idx = Some(argmin(&laptimes));
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn lap(&self, idx: usize) -> Option<&LapRecord> {
        self.laps.get(idx)
    }

    /// best_lap_ms returns the smallest elapsed time among the sealed laps.
    pub fn best_lap_ms(&self) -> Option<f64> {
        self.best_idx.map(|idx| self.laps[idx].elapsed_ms)
    }

    /// best_frames returns the trace of the fastest sealed lap.
    pub fn best_frames(&self) -> Option<&[VehicleState]> {
        self.best_idx.map(|idx| self.laps[idx].frames.as_slice())
    }

    /// ghost_frame indexes the best-lap trace by the current lap's frame counter. Frame-for-frame
    /// rather than time-for-time: with a varying tick rate the ghost drifts from true time
    /// parity, which is accepted here.
    pub fn ghost_frame(&self, frame_idx: usize) -> Option<VehicleState> {
        self.best_frames()
            .and_then(|frames| frames.get(frame_idx))
            .copied()
    }

    /// clear drops all laps, the best lap and the in-flight buffer (full restart).
    pub fn clear(&mut self) {
        self.laps.clear();
        self.current.clear();
        self.best_idx = None;
    }
}

/// ReplayCursor walks the frames of one sealed LapRecord read-only, once per render tick. It
/// never touches the live vehicle state and terminates exactly at frames.len().
#[derive(Debug)]
pub struct ReplayCursor {
    frames: Vec<VehicleState>,
    cursor: usize,
}

impl ReplayCursor {
    pub fn new(frames: Vec<VehicleState>) -> ReplayCursor {
        ReplayCursor { frames, cursor: 0 }
    }

    /// current returns the frame at the cursor, or None once the replay is finished.
    pub fn current(&self) -> Option<&VehicleState> {
        self.frames.get(self.cursor)
    }

    /// advance moves the cursor one frame forward and returns the new frame, or None when the
    /// end of the record is reached.
    pub fn advance(&mut self) -> Option<&VehicleState> {
        if self.cursor + 1 >= self.frames.len() {
            self.cursor = self.frames.len();
            return None;
        }
        self.cursor += 1;
        self.frames.get(self.cursor)
    }

    pub fn finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(x: f64) -> VehicleState {
        VehicleState {
            x,
            y: 0.0,
            speed: 1.0,
            heading_deg: 0.0,
            is_skidding: false,
        }
    }

    fn book_with_laps(times: &[f64]) -> LapBook {
        let mut book = LapBook::new();
        for (i, &time) in times.iter().enumerate() {
            book.record_frame(frame(i as f64));
            book.record_frame(frame(i as f64 + 0.5));
            book.seal_lap(time);
        }
        book
    }

    #[test]
    fn best_lap_is_the_minimum_elapsed_time() {
        let book = book_with_laps(&[65000.0, 58000.0, 70000.0]);

        assert_eq!(book.laps().len(), 3);
        assert_relative_eq!(book.best_lap_ms().unwrap(), 58000.0);

        // the best trace is the second lap's frames
        let best = book.best_frames().unwrap();
        assert_relative_eq!(best[0].x, 1.0);
        assert_relative_eq!(best[1].x, 1.5);
    }

    #[test]
    fn equal_lap_time_does_not_replace_the_best() {
        let book = book_with_laps(&[58000.0, 58000.0]);

        let best = book.best_frames().unwrap();
        assert_relative_eq!(best[0].x, 0.0);
    }

    #[test]
    fn sealing_starts_a_fresh_buffer() {
        let mut book = LapBook::new();
        book.record_frame(frame(1.0));
        book.seal_lap(1000.0);

        assert_eq!(book.current_frame_count(), 0);
        assert_eq!(book.laps()[0].frames.len(), 1);
    }

    #[test]
    fn ghost_frame_indexes_the_best_trace() {
        let book = book_with_laps(&[65000.0, 58000.0]);

        assert_relative_eq!(book.ghost_frame(0).unwrap().x, 1.0);
        assert_relative_eq!(book.ghost_frame(1).unwrap().x, 1.5);
        // past the end of the best trace there is no ghost
        assert!(book.ghost_frame(2).is_none());
    }

    #[test]
    fn replay_cursor_is_monotonic_and_terminates_at_the_end() {
        let frames = vec![frame(0.0), frame(1.0), frame(2.0)];
        let mut cursor = ReplayCursor::new(frames);

        assert_relative_eq!(cursor.current().unwrap().x, 0.0);
        assert_relative_eq!(cursor.advance().unwrap().x, 1.0);
        assert_relative_eq!(cursor.advance().unwrap().x, 2.0);
        assert!(!cursor.finished());

        assert!(cursor.advance().is_none());
        assert!(cursor.finished());
        assert_eq!(cursor.position(), 3);

        // advancing past the end keeps the cursor at frames.len()
        assert!(cursor.advance().is_none());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn empty_replay_is_immediately_finished() {
        let mut cursor = ReplayCursor::new(Vec::new());
        assert!(cursor.finished());
        assert!(cursor.current().is_none());
        assert!(cursor.advance().is_none());
    }
}
