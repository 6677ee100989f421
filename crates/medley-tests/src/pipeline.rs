//! Decode-ahead pipeline tests: a producer thread fills a shared pool while
//! a consumer drains it by presentation time.

use crossbeam_channel::bounded;
use medley_blocks::{CapacityLimit, PixelFormat, PoolConfig, SharedBlockPool, VideoFrame};
use medley_core::{MediaKind, Timestamp};
use std::sync::atomic::{AtomicI64, Ordering};

const FRAME_MS: i64 = 40;

fn frame_at(index: i64) -> VideoFrame {
    let mut frame = VideoFrame::new(
        16,
        16,
        Timestamp::from_millis(index * FRAME_MS),
        Timestamp::from_millis(FRAME_MS),
    );
    frame.coded_picture_number = index;
    frame
}

#[test]
fn decoded_frames_flow_through_a_channel_into_the_pool() {
    let pool = SharedBlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(8),
    ));
    let (frame_tx, frame_rx) = bounded::<VideoFrame>(4);

    std::thread::scope(|scope| {
        let producer_pool = pool.clone();
        scope.spawn(move || {
            for frame in frame_rx {
                let mut block = producer_pool.with_mut(|p| p.acquire());
                block.load_video(&frame, PixelFormat::Bgr24).unwrap();
                // Stamp the payload so recycling bugs would show up as a
                // stale first byte
                let stamp = frame.coded_picture_number as u8;
                block.picture_mut().unwrap().fill(stamp);
                producer_pool.with_mut(|p| p.add(block)).unwrap();
            }
        });

        for i in 0..60 {
            frame_tx.send(frame_at(i)).unwrap();
        }
        drop(frame_tx);
    });

    // The window holds the last 8 frames, all in recycled shells
    pool.with(|p| {
        assert_eq!(p.len(), 8);
        assert_eq!(p.spare_count(), 1);
        assert_eq!(p.range_start(), Some(Timestamp::from_millis(52 * FRAME_MS)));
        for block in p.blocks() {
            let number = block.as_video().unwrap().coded_picture_number;
            assert_eq!(block.buffer()[0], number as u8);
            assert_eq!(block.buffer_capacity(), 16 * 16 * 3);
        }
    });
}

#[test]
fn render_clock_paces_the_decoder() {
    const TICKS: i64 = 40;
    // Stay well inside the 8-block window so the consumer's current block
    // is never evicted out from under it
    const AHEAD_MS: i64 = 200;

    let pool = SharedBlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(8),
    ));
    let clock_ms = AtomicI64::new(0);

    std::thread::scope(|scope| {
        let producer_pool = pool.clone();
        let producer_clock = &clock_ms;
        scope.spawn(move || {
            for i in 0..TICKS {
                while i * FRAME_MS > producer_clock.load(Ordering::Acquire) + AHEAD_MS {
                    std::thread::yield_now();
                }
                let frame = frame_at(i);
                let mut block = producer_pool.with_mut(|p| p.acquire());
                block.load_video(&frame, PixelFormat::Bgr24).unwrap();
                block.picture_mut().unwrap().fill(i as u8);
                producer_pool.with_mut(|p| p.add(block)).unwrap();
            }
        });

        let consumer_pool = pool.clone();
        let consumer_clock = &clock_ms;
        scope.spawn(move || {
            for tick in 0..TICKS {
                consumer_clock.store(tick * FRAME_MS, Ordering::Release);
                let time = Timestamp::from_millis(tick * FRAME_MS + 10);
                let (number, stamp) = loop {
                    let hit = consumer_pool.with(|p| {
                        p.retrieve_at(time).block().and_then(|block| {
                            block.covers(time).then(|| {
                                let layout = block.as_video().unwrap();
                                (layout.coded_picture_number, block.buffer()[0])
                            })
                        })
                    });
                    match hit {
                        Some(found) => break found,
                        None => std::thread::yield_now(),
                    }
                };
                assert_eq!(number, tick);
                assert_eq!(stamp, tick as u8);
            }
        });
    });

    pool.with(|p| assert_eq!(p.len(), 8));
}

#[test]
fn pools_for_different_kinds_run_without_a_shared_lock() {
    use medley_blocks::{AudioFrame, SampleFormat};

    let video = SharedBlockPool::new(PoolConfig::new(
        MediaKind::Video,
        CapacityLimit::Blocks(16),
    ));
    let audio = SharedBlockPool::new(PoolConfig::new(
        MediaKind::Audio,
        CapacityLimit::Blocks(64),
    ));

    std::thread::scope(|scope| {
        let video_pool = video.clone();
        scope.spawn(move || {
            for i in 0..200 {
                let frame = frame_at(i);
                let mut block = video_pool.with_mut(|p| p.acquire());
                block.load_video(&frame, PixelFormat::Bgr24).unwrap();
                video_pool.with_mut(|p| p.add(block)).unwrap();
            }
        });

        let audio_pool = audio.clone();
        scope.spawn(move || {
            for i in 0..200 {
                let frame = AudioFrame::new(48_000, 2, 960, Timestamp::from_millis(i * 20));
                let mut block = audio_pool.with_mut(|p| p.acquire());
                block.load_audio(&frame, SampleFormat::S16).unwrap();
                audio_pool.with_mut(|p| p.add(block)).unwrap();
            }
        });
    });

    video.with(|p| {
        assert_eq!(p.len(), 16);
        assert_eq!(p.range_end(), Some(Timestamp::from_millis(200 * FRAME_MS)));
    });
    audio.with(|p| {
        assert_eq!(p.len(), 64);
        assert_eq!(p.range_end(), Some(Timestamp::from_millis(200 * 20)));
    });
}
