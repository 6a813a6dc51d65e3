use sensor::{CameraSettings, CaptureError, FrameSource, RawFrames};

#[tokio::test]
async fn decodes_consecutive_frames() {
    let mut bytes = vec![0u8; 2 * 2 * 3];
    bytes.extend(vec![255u8; 2 * 2 * 3]);
    let mut frames = RawFrames::new(bytes.as_slice(), 2, 2);
    assert_eq!(frames.frame_size(), 12);

    let first = frames.next_frame().await.unwrap().to_rgb8();
    assert_eq!(first.dimensions(), (2, 2));
    assert_eq!(first.get_pixel(1, 1).0, [0, 0, 0]);

    let second = frames.next_frame().await.unwrap().to_rgb8();
    assert_eq!(second.get_pixel(0, 0).0, [255, 255, 255]);

    assert!(matches!(frames.next_frame().await, Err(CaptureError::Ended)));
}

#[tokio::test]
async fn partial_frame_ends_stream() {
    let bytes = vec![7u8; 5];
    let mut frames = RawFrames::new(bytes.as_slice(), 2, 2);
    assert!(matches!(frames.next_frame().await, Err(CaptureError::Ended)));
}

#[test]
fn default_camera_is_first_v4l2_device() {
    let settings = CameraSettings::default();
    assert_eq!(settings.device, "/dev/video0");
    assert_eq!(settings.input_format, "v4l2");
    assert_eq!((settings.width, settings.height), (640, 480));
}
