use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::whole(30).unwrap(),
        background: Rgba8Premul::opaque(255, 255, 255),
    }
}

fn frame(w: u32, h: u32, v: u8) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![v; FrameRGBA::byte_len(w, h)],
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_emits_one_hash_chunk_per_frame() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, 1)).unwrap();
    sink.push_frame(FrameIndex(2), &frame(2, 2, 9)).unwrap();
    let out = sink.end().unwrap();

    assert_eq!(out.mime, FRAME_HASH_MIME);
    assert_eq!(out.chunks.len(), 3);
    assert!(out.chunks.iter().all(|c| c.len() == 16));

    let pairs = decode_frame_hashes(&out.chunks.concat()).unwrap();
    assert_eq!(pairs[1].0, 1);
    assert_eq!(pairs[0].1, pairs[1].1);
    assert_ne!(pairs[1].1, pairs[2].1);
}

#[test]
fn in_memory_sink_enforces_order_and_size() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).is_err());
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 2, 0)).unwrap();
    assert!(matches!(
        sink.push_frame(FrameIndex(3), &frame(2, 2, 0)),
        Err(SketchreelError::Encode(_))
    ));
    assert!(sink.push_frame(FrameIndex(4), &frame(4, 2, 0)).is_err());
}

#[test]
fn retaining_sink_keeps_frames_after_being_moved() {
    let (sink, frames) = InMemorySink::retaining();
    let mut boxed: Box<dyn FrameSink> = Box::new(sink);
    boxed.begin(cfg(1, 1)).unwrap();
    boxed.push_frame(FrameIndex(0), &frame(1, 1, 5)).unwrap();
    boxed.push_frame(FrameIndex(1), &frame(1, 1, 6)).unwrap();
    boxed.end().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames.last().unwrap().data, vec![6; 4]);
}

#[test]
fn end_without_begin_fails_and_abort_discards() {
    let mut sink = InMemorySink::new();
    assert!(sink.end().is_err());
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1, 1, 5)).unwrap();
    sink.abort();
    assert!(sink.end().is_err());
}

#[test]
fn last_frame_sink_keeps_only_latest() {
    let (mut sink, last) = LastFrameSink::new();
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1, 1, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(1, 1, 2)).unwrap();
    let out = sink.end().unwrap();
    assert!(out.chunks.is_empty());
    assert_eq!(last.get().unwrap().data, vec![2; 4]);
}

#[test]
fn hash_stream_rejects_truncated_bytes() {
    assert!(decode_frame_hashes(&[0; 15]).is_err());
    assert!(decode_frame_hashes(&[]).unwrap().is_empty());
}
