pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod model_resolver;
    pub mod onnx_session;
    pub mod video_metadata;
}

pub mod detection {
    pub mod domain {
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod encoding {
    pub mod domain {
        pub mod face_encoder;
        pub mod face_signature;
    }
    pub mod infrastructure;
}

pub mod recognition {
    pub mod domain {
        pub mod face_analyzer;
        pub mod found_names;
        pub mod frame_matcher;
        pub mod match_result;
        pub mod reference_loader;
        pub mod reference_set;
    }
}

pub mod annotation {
    pub mod domain {
        pub mod frame_annotator;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod image_writer;
        pub mod video_reader;
        pub mod video_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod frame_sink;
    pub mod recognition_pipeline;
    pub mod recognize_image_use_case;
    pub mod recognize_live_use_case;
    pub mod recognize_video_use_case;
    pub mod staged_output;
}

#[cfg(test)]
pub(crate) mod testing;
