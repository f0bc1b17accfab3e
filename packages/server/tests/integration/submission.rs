use common::storage::AttachmentKind;

use crate::common::{AUDIO_BYTES, IMAGE_BYTES, SiteForm, TestApp};

mod accepted {
    use super::*;

    #[tokio::test]
    async fn golconda_fort_is_recorded_with_location_and_no_audio() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda()).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.id() > 0);
        assert_eq!(res.body["title"], "Golconda Fort");
        assert_eq!(res.body["category"], "Fort");
        assert_eq!(res.body["language"], "Telugu");
        assert_eq!(res.body["place_name"], "Hyderabad");
        assert_eq!(res.body["latitude"].as_f64().unwrap(), 17.3833);
        assert_eq!(res.body["longitude"].as_f64().unwrap(), 78.4011);
        assert!(res.body["audio_ref"].is_null());
        assert!(res.body["video_ref"].is_null());
        assert!(res.body["document_ref"].is_null());
        assert!(res.body["created_at"].as_str().is_some());

        let image_ref = res.body["image_ref"].as_str().unwrap();
        assert!(image_ref.starts_with("image_"));
        assert!(image_ref.ends_with(".png"));

        assert_eq!(app.record_count().await, 1);
        assert_eq!(app.stored_files(AttachmentKind::Image), 1);
        assert_eq!(app.temp_files(), 0);
    }

    #[tokio::test]
    async fn every_attachment_slot_is_stored() {
        let app = TestApp::spawn().await;

        let form = SiteForm::new("Stepwell at Bansilalpet", "Well")
            .file("audio", "story.mp3", AUDIO_BYTES.to_vec())
            .file("video", "walkthrough.mp4", b"fake mp4".to_vec())
            .file("document", "history.pdf", b"%PDF-1.7 fake".to_vec());
        let res = app.submit(form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["audio_ref"].as_str().unwrap().starts_with("audio_"));
        assert!(res.body["video_ref"].as_str().unwrap().starts_with("video_"));
        assert!(
            res.body["document_ref"]
                .as_str()
                .unwrap()
                .starts_with("document_")
        );
        assert_eq!(app.all_stored_files(), 4);
    }

    #[tokio::test]
    async fn extension_check_is_case_insensitive() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().file("image", "IMG.PNG", IMAGE_BYTES.to_vec()))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["image_ref"].as_str().unwrap().ends_with(".png"));
    }

    #[tokio::test]
    async fn language_defaults_to_english() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().without("language")).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["language"], "English");
    }

    #[tokio::test]
    async fn multi_word_category_is_accepted() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::new("Old Banyan of Chevella", "Sacred Tree"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["category"], "Sacred Tree");
    }

    #[tokio::test]
    async fn empty_optional_file_part_is_treated_as_absent() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().file("audio", "", Vec::new()))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["audio_ref"].is_null());
        assert_eq!(app.stored_files(AttachmentKind::Audio), 0);
    }

    #[tokio::test]
    async fn identical_uploads_get_distinct_references() {
        let app = TestApp::spawn().await;

        let first = app.submit(SiteForm::golconda()).await;
        let second = app.submit(SiteForm::golconda()).await;

        assert_eq!(first.status, 201);
        assert_eq!(second.status, 201);
        assert_ne!(first.body["image_ref"], second.body["image_ref"]);
        assert_ne!(first.id(), second.id());
        assert_eq!(app.stored_files(AttachmentKind::Image), 2);
    }

    #[tokio::test]
    async fn concurrent_submissions_never_collide() {
        let app = TestApp::spawn().await;

        let responses = futures::future::join_all(
            (0..8).map(|i| app.submit(SiteForm::new(&format!("Temple {i}"), "Temple"))),
        )
        .await;

        let mut ids = Vec::new();
        let mut refs = Vec::new();
        for res in &responses {
            assert_eq!(res.status, 201, "{}", res.text);
            ids.push(res.id());
            refs.push(res.body["image_ref"].as_str().unwrap().to_string());
        }
        ids.sort_unstable();
        ids.dedup();
        refs.sort();
        refs.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(refs.len(), 8);
        assert_eq!(app.record_count().await, 8);
        assert_eq!(app.stored_files(AttachmentKind::Image), 8);
    }
}

mod rejected {
    use super::*;

    async fn assert_nothing_written(app: &TestApp) {
        assert_eq!(app.record_count().await, 0);
        assert_eq!(app.all_stored_files(), 0);
        assert_eq!(app.temp_files(), 0);
    }

    #[tokio::test]
    async fn missing_title_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().without("title")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "title");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn blank_description_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().text("description", "   "))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "description");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn overlong_title_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().text("title", &"a".repeat(101)))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn title_at_the_limit_is_accepted() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().text("title", &"అ".repeat(100)))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn missing_category_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().without("category")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "category");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn unknown_category_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().text("category", "Castle")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "category");
    }

    #[tokio::test]
    async fn missing_image_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().without("image")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "image");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn disallowed_extension_is_an_invalid_file_type() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().file("image", "img.exe", IMAGE_BYTES.to_vec()))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_FILE_TYPE");
        assert_eq!(res.body["field"], "image");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn audio_in_the_wrong_slot_is_an_invalid_file_type() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().file("audio", "photo.jpg", IMAGE_BYTES.to_vec()))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_FILE_TYPE");
        assert_eq!(res.body["field"], "audio");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_before_anything_is_written() {
        let app = TestApp::spawn().await;
        let too_big = vec![0u8; 5 * 1024 * 1024 + 1];

        let res = app
            .submit(SiteForm::golconda().file("image", "huge.jpg", too_big))
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.code(), "FILE_TOO_LARGE");
        assert_eq!(res.body["field"], "image");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn image_beyond_the_request_limit_is_still_file_too_large() {
        let app = TestApp::spawn().await;
        let far_too_big = vec![0u8; 22 * 1024 * 1024];

        let res = app
            .submit(SiteForm::golconda().file("image", "huge.jpg", far_too_big))
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.code(), "FILE_TOO_LARGE");
        assert_eq!(res.body["field"], "image");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn oversized_optional_attachment_fails_the_whole_submission() {
        let app = TestApp::spawn_with(|config| config.storage.max_attachment_size = 64).await;

        let res = app
            .submit(SiteForm::new("Charminar", "Monument").file("audio", "story.wav", vec![1u8; 65]))
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.code(), "FILE_TOO_LARGE");
        assert_eq!(res.body["field"], "audio");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn named_empty_file_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().file("image", "blank.png", Vec::new()))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn missing_location_is_location_required() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().without("latitude").without("longitude"))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "LOCATION_REQUIRED");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn half_a_location_is_location_required() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().text("longitude", "")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "LOCATION_REQUIRED");
        assert_nothing_written(&app).await;
    }

    #[tokio::test]
    async fn unparseable_coordinate_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .submit(SiteForm::golconda().text("latitude", "north-ish"))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "latitude");
    }

    #[tokio::test]
    async fn out_of_range_coordinate_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.submit(SiteForm::golconda().text("longitude", "181")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "longitude");
        assert_nothing_written(&app).await;
    }
}

mod failed_writes {
    use super::*;

    #[tokio::test]
    async fn persistence_failure_removes_written_attachments() {
        let app = TestApp::spawn().await;
        app.execute_sql("DROP TABLE site_record").await;

        let res = app
            .submit(SiteForm::golconda().file("audio", "story.wav", AUDIO_BYTES.to_vec()))
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.code(), "PERSISTENCE_ERROR");
        assert_eq!(app.all_stored_files(), 0);
        assert_eq!(app.temp_files(), 0);
    }

    #[tokio::test]
    async fn storage_failure_removes_earlier_attachments_and_inserts_nothing() {
        let app = TestApp::spawn().await;

        // A file where the audio partition should be makes every audio write fail.
        let audio_dir = app.attachments_root.join("audio");
        std::fs::remove_dir_all(&audio_dir).unwrap();
        std::fs::write(&audio_dir, b"not a directory").unwrap();

        let res = app
            .submit(SiteForm::golconda().file("audio", "story.wav", AUDIO_BYTES.to_vec()))
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.code(), "STORAGE_WRITE_ERROR");
        assert_eq!(app.record_count().await, 0);
        assert_eq!(app.stored_files(AttachmentKind::Image), 0);
        assert_eq!(app.temp_files(), 0);
    }
}
