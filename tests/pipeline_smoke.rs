use vidsmith::{ImageOrigin, Pipeline, PipelineConfig, SourceChain};

fn offline_pipeline(dir: &std::path::Path, prompt_seed: u64) -> Pipeline {
    let config = PipelineConfig {
        width: 32,
        height: 32,
        frame_count: 12,
        fps: 10,
        use_action_sequence: false,
        extra_key_images: 0,
        mux_audio: false,
        out_dir: dir.to_path_buf(),
        seed: Some(prompt_seed),
    };
    Pipeline::new(config, SourceChain::local_only())
}

#[test]
fn offline_run_produces_a_playable_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = offline_pipeline(dir.path(), 7);

    let artifact = pipeline.generate("a cat dancing in the rain").unwrap();

    assert!(artifact.path.exists());
    assert!(artifact.byte_size > 0);
    assert_eq!(artifact.frames_written, 12);
    assert_eq!(artifact.origin, ImageOrigin::Procedural);
    // MP4 when ffmpeg is installed, GIF fallback otherwise.
    assert!(artifact.container == "mp4" || artifact.container == "gif");
}

#[test]
fn artifact_names_follow_the_convention() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = offline_pipeline(dir.path(), 8);

    let artifact = pipeline.generate("a dragon breathing fire").unwrap();
    let name = artifact.path.file_name().unwrap().to_str().unwrap();
    assert!(
        name.starts_with("ai_video_") || name.starts_with("fallback_"),
        "unexpected artifact name: {name}"
    );
}

#[test]
fn invalid_prompt_fails_before_touching_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = offline_pipeline(dir.path(), 1);

    assert!(pipeline.generate("ab").is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
