//! Round-trip tests: replaying the emitted instruction stream against an
//! all-blank grid must reconstruct exactly the glyph grids the encoder
//! classified, frame by frame.

use blockcast::sampler::cell_quarters;
use blockcast::{
    BlockEncoder, Frame, Palette, ACTIVE_COLS, BLANK_CODE, COL_MARGIN, FRAME_HEIGHT, FRAME_WIDTH,
    GRID_COLS, GRID_ROWS,
};

fn frame_from_fn(f: impl Fn(u32, u32) -> u8) -> Frame {
    let mut samples = Vec::with_capacity((FRAME_WIDTH * FRAME_HEIGHT) as usize);
    for row in 0..FRAME_HEIGHT {
        for col in 0..FRAME_WIDTH {
            samples.push(f(col, row));
        }
    }
    Frame::new(FRAME_WIDTH, FRAME_HEIGHT, samples).unwrap()
}

fn test_frames() -> Vec<Frame> {
    let top_half = frame_from_fn(|_, row| if row < 180 { 255 } else { 0 });
    let left_half = frame_from_fn(|col, _| if col < 240 { 255 } else { 0 });
    let white = frame_from_fn(|_, _| 255);
    vec![
        frame_from_fn(|_, _| 0),
        top_half,
        left_half,
        white.clone(),
        white, // identical to the previous frame
        frame_from_fn(|col, row| if (row / 36 + col / 48) % 2 == 0 { 255 } else { 0 }),
    ]
}

/// Apply one frame-record to a decoder grid, checking the wire format as we
/// go: `db ` prefix, skips within 1..=255, trailing `0` terminator.
fn replay_record(line: &str, grid: &mut [[u8; GRID_COLS]; GRID_ROWS]) {
    let body = line.strip_prefix("db ").expect("record prefix");
    let nums: Vec<i64> = body
        .split(',')
        .map(|t| t.trim().parse().expect("integer token"))
        .collect();
    assert_eq!(*nums.last().unwrap(), 0, "record terminator");
    let pairs = &nums[..nums.len() - 1];
    assert_eq!(pairs.len() % 2, 0, "pairs come in twos");
    let mut cursor: i64 = -1;
    for pair in pairs.chunks(2) {
        let (skip, code) = (pair[0], pair[1]);
        assert!((1..=255).contains(&skip), "skip {skip} out of range");
        assert!((0..=255).contains(&code), "glyph {code} out of range");
        cursor += skip;
        grid[(cursor / GRID_COLS as i64) as usize][(cursor % GRID_COLS as i64) as usize] =
            code as u8;
    }
}

/// The grid a decoder should hold after a frame: blank margins plus the
/// classification of every active cell.
fn classified_grid(palette: &Palette, frame: &Frame) -> [[u8; GRID_COLS]; GRID_ROWS] {
    let mut grid = [[BLANK_CODE; GRID_COLS]; GRID_ROWS];
    for (y, row) in grid.iter_mut().enumerate() {
        for x in 0..ACTIVE_COLS {
            row[x + COL_MARGIN] = palette.classify(&cell_quarters(frame, x, y));
        }
    }
    grid
}

fn encode_to_string(frames: &[Frame]) -> String {
    let encoder = BlockEncoder::new();
    let mut out = Vec::new();
    let stats = encoder
        .encode_frames(frames.iter().cloned().map(Ok), &mut out)
        .unwrap();
    assert_eq!(stats.frames, frames.len());
    String::from_utf8(out).unwrap()
}

#[test]
fn stream_replays_to_the_classified_grids() {
    let frames = test_frames();
    let stream = encode_to_string(&frames);
    let records: Vec<&str> = stream.lines().collect();
    assert_eq!(records.len(), frames.len());

    let palette = Palette::new(BlockEncoder::new().config().palette.clone()).unwrap();
    let mut grid = [[BLANK_CODE; GRID_COLS]; GRID_ROWS];
    for (record, frame) in records.iter().zip(&frames) {
        replay_record(record, &mut grid);
        assert_eq!(grid, classified_grid(&palette, frame));
    }
}

#[test]
fn identical_frame_produces_an_empty_record() {
    let frames = test_frames();
    let stream = encode_to_string(&frames);
    let records: Vec<&str> = stream.lines().collect();
    // Frame 5 repeats frame 4; its record carries only the terminator.
    assert_eq!(records[4], "db 0");
    // So does the opening all-black frame against the initial blank grid.
    assert_eq!(records[0], "db 0");
}

#[test]
fn encoding_is_deterministic() {
    let frames = test_frames();
    assert_eq!(encode_to_string(&frames), encode_to_string(&frames));
}
