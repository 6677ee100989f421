//! Integration tests for block pool workflows.

use medley_blocks::{
    AudioFrame, BlockPool, CapacityLimit, PixelFormat, PoolConfig, Retrieved, SampleFormat,
    SubtitleFrame, VideoFrame,
};
use medley_core::{MediaKind, Timestamp};

fn push_video(pool: &mut BlockPool, start_ms: i64, duration_ms: i64, width: u32, height: u32) {
    let mut block = pool.acquire();
    let frame = VideoFrame::new(
        width,
        height,
        Timestamp::from_millis(start_ms),
        Timestamp::from_millis(duration_ms),
    );
    block.load_video(&frame, PixelFormat::Bgr24).unwrap();
    pool.add(block).unwrap();
}

#[test]
fn window_of_two_drops_the_oldest_block() {
    let mut pool = BlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(2),
    ));
    for start in [0, 100, 200] {
        push_video(&mut pool, start, 100, 16, 16);
    }

    assert_eq!(pool.len(), 2);
    assert!(matches!(
        pool.retrieve_at(Timestamp::from_millis(50)),
        Retrieved::BeforeStart
    ));
    let block = pool
        .retrieve_at(Timestamp::from_millis(150))
        .block()
        .unwrap();
    assert_eq!(block.start_time(), Timestamp::from_millis(100));
}

#[test]
fn steady_state_streaming_reuses_buffer_regions() {
    use std::collections::HashSet;

    let mut pool = BlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(6),
    ));
    let mut regions: HashSet<usize> = HashSet::new();

    for i in 0..24 {
        push_video(&mut pool, i * 40, 40, 32, 32);
        for resident in pool.blocks() {
            regions.insert(resident.buffer().as_ptr() as usize);
        }
    }

    assert_eq!(pool.len(), 6);
    // Warmup creates at most capacity + 1 regions; every later frame lands
    // in a recycled one.
    assert!(
        regions.len() <= 7,
        "saw {} distinct buffer regions",
        regions.len()
    );
}

#[test]
fn resolution_change_mid_stream_resizes_buffers() {
    let mut pool = BlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(4),
    ));
    for i in 0..4 {
        push_video(&mut pool, i * 40, 40, 64, 48);
    }
    assert!(pool
        .blocks()
        .iter()
        .all(|b| b.buffer_len() == 64 * 48 * 3));

    // The stream switches resolution; recycled shells regrow their regions
    for i in 4..12 {
        push_video(&mut pool, i * 40, 40, 128, 96);
    }

    assert_eq!(pool.len(), 4);
    for block in pool.blocks() {
        assert!(block.is_loaded());
        assert_eq!(block.buffer_len(), 128 * 96 * 3);
        assert_eq!(block.as_video().unwrap().pixel_width, 128);
    }
}

#[test]
fn seek_clears_and_refills_the_window() {
    let mut pool = BlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(10),
    ));
    for i in 0..10 {
        push_video(&mut pool, i * 40, 40, 16, 16);
    }
    assert!(pool.is_full());

    // Seek far forward: flush the window, then refill at the new position
    pool.clear();
    assert!(pool.is_empty());
    assert!(pool.spare_count() >= 10);

    for i in 0..10 {
        push_video(&mut pool, 60_000 + i * 40, 40, 16, 16);
    }
    assert_eq!(pool.len(), 10);
    let block = pool
        .retrieve_at(Timestamp::from_millis(60_100))
        .block()
        .unwrap();
    assert!(block.covers(Timestamp::from_millis(60_100)));
    assert!(matches!(
        pool.retrieve_at(Timestamp::ZERO),
        Retrieved::BeforeStart
    ));
}

#[test]
fn unnumbered_stream_recovers_picture_numbers() {
    let mut pool = BlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(30),
    ));
    for i in 0..25 {
        push_video(&mut pool, i * 40, 40, 16, 16);
    }

    for (i, block) in pool.blocks().iter().enumerate() {
        assert_eq!(block.as_video().unwrap().display_picture_number, i as i64);
    }
}

#[test]
fn pools_per_kind_cover_one_timeline() {
    let clock = Timestamp::from_millis(1500);

    // One second of decode-ahead video at 25 fps
    let mut video = BlockPool::with_defaults(MediaKind::Video);
    for i in 0..50 {
        push_video(&mut video, i * 40, 40, 16, 16);
    }

    // 20 ms audio frames across the same two seconds
    let mut audio = BlockPool::with_defaults(MediaKind::Audio);
    for i in 0..100 {
        let mut block = audio.acquire();
        let frame = AudioFrame::new(48_000, 2, 960, Timestamp::from_millis(i * 20));
        block.load_audio(&frame, SampleFormat::S16).unwrap();
        audio.add(block).unwrap();
    }

    // One long-lived cue over [1.0s, 3.5s)
    let mut subtitles = BlockPool::with_defaults(MediaKind::Subtitle);
    let mut cue = subtitles.acquire();
    cue.load_subtitle(&SubtitleFrame::new(
        vec!["Previously, on Medley...".into()],
        Timestamp::from_millis(1000),
        Timestamp::from_millis(2500),
    ))
    .unwrap();
    subtitles.add(cue).unwrap();

    let picture = video.retrieve_at(clock).block().unwrap();
    assert!(picture.covers(clock));
    assert_eq!(picture.as_video().unwrap().pixel_width, 16);

    let samples = audio.retrieve_at(clock).block().unwrap();
    assert!(samples.covers(clock));
    assert_eq!(samples.as_audio().unwrap().sample_rate, 48_000);

    let caption = subtitles.retrieve_at(clock).block().unwrap();
    assert!(caption.covers(clock));
    assert_eq!(caption.cue(0), Some("Previously, on Medley..."));
}

#[test]
fn audio_byte_budget_tracks_a_sliding_window() {
    // 960 stereo S16 samples: 3840 bytes per 20 ms block
    let per_block = 3840;
    let mut pool = BlockPool::new(PoolConfig::new(
        MediaKind::Audio,
        CapacityLimit::Bytes(per_block * 10),
    ));

    for i in 0..40 {
        let mut block = pool.acquire();
        let frame = AudioFrame::new(48_000, 2, 960, Timestamp::from_millis(i * 20));
        block.load_audio(&frame, SampleFormat::S16).unwrap();
        pool.add(block).unwrap();
        assert!(pool.resident_bytes() <= per_block * 10);
    }

    assert_eq!(pool.len(), 10);
    assert_eq!(pool.range_start(), Some(Timestamp::from_millis(600)));
    assert_eq!(pool.range_end(), Some(Timestamp::from_millis(800)));
    assert_eq!(pool.range_duration(), Some(Timestamp::from_millis(200)));
}
