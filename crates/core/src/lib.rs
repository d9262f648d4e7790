pub mod detection {
    pub mod domain {
        pub mod detection;
        pub mod expression_classifier;
        pub mod face_detector;
        pub mod face_locator;
    }
    pub mod infrastructure;
}

pub mod emotion {
    pub mod domain {
        pub mod emotion_tally;
        pub mod expression;
        pub mod expression_scores;
    }
}

pub mod overlay {
    pub mod domain {
        pub mod overlay_surface;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod frame_loop;
    pub mod frame_scheduler;
    pub mod infrastructure;
    pub mod loop_logger;
    pub mod startup_use_case;
}

pub mod presentation {
    pub mod domain {
        pub mod chart_widget;
        pub mod status_display;
        pub mod user_alert;
    }
    pub mod infrastructure;
}

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod frame;
    pub mod video_metadata;
}

pub mod video {
    pub mod domain {
        pub mod video_source;
    }
    pub mod infrastructure {
        pub mod ffmpeg_video_source;
    }
}
