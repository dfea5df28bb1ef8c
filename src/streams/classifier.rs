//! Input classification into video and audio slots

use tracing::{debug, warn};

use crate::domain::model::{GapType, MediaKind, TrackInfo};

/// One classified timeline input
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedInput {
    /// Position in the track list
    pub position: usize,
    pub kind: MediaKind,
    /// Index of the matching `-i` argument, `None` for gaps
    pub file_index: Option<usize>,
    pub track: TrackInfo,
}

impl ClassifiedInput {
    pub fn is_gap(&self) -> bool {
        self.kind == MediaKind::Gap
    }
}

/// Result of classifying a track list
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Video slots: video files, images and video gaps
    pub video: Vec<ClassifiedInput>,
    /// Audio slots: audio files and audio gaps
    pub audio: Vec<ClassifiedInput>,
    /// Number of real `-i` inputs
    pub file_input_count: usize,
}

impl Classification {
    /// Real inputs in `-i` order
    pub fn file_inputs(&self) -> Vec<&ClassifiedInput> {
        let mut inputs: Vec<&ClassifiedInput> = self
            .video
            .iter()
            .chain(self.audio.iter())
            .filter(|input| input.file_index.is_some())
            .collect();
        inputs.sort_by_key(|input| input.file_index);
        inputs
    }

    /// All slots in timeline order
    pub fn in_order(&self) -> Vec<&ClassifiedInput> {
        let mut inputs: Vec<&ClassifiedInput> = self.video.iter().chain(self.audio.iter()).collect();
        inputs.sort_by_key(|input| input.position);
        inputs
    }

    /// Whether any real audio file sits in the list
    pub fn has_audio_files(&self) -> bool {
        self.audio.iter().any(|input| !input.is_gap())
    }

    /// Whether any slot is a gap of either type
    pub fn has_gaps(&self) -> bool {
        self.video.iter().chain(self.audio.iter()).any(ClassifiedInput::is_gap)
    }

    /// Total number of timeline slots
    pub fn len(&self) -> usize {
        self.video.len() + self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }
}

/// Walk the tracks once, assigning file indices to non-gap inputs
pub fn classify(tracks: &[TrackInfo]) -> Classification {
    let mut classification = Classification::default();
    let mut next_file_index = 0;

    for (position, track) in tracks.iter().enumerate() {
        let kind = track.kind();
        if !track.is_recognized() {
            warn!("Unrecognized media extension for {}, treating as video", track.path);
        }
        let file_index = if kind == MediaKind::Gap {
            None
        } else {
            let index = next_file_index;
            next_file_index += 1;
            Some(index)
        };

        let input = ClassifiedInput {
            position,
            kind,
            file_index,
            track: track.clone(),
        };

        let audio_slot = match kind {
            MediaKind::Audio => true,
            MediaKind::Gap => track.gap_type == Some(GapType::Audio),
            MediaKind::Video | MediaKind::Image => false,
        };

        if audio_slot {
            classification.audio.push(input);
        } else {
            classification.video.push(input);
        }
    }

    classification.file_input_count = next_file_index;
    debug!(
        "Classified {} inputs: {} video slots, {} audio slots, {} files",
        tracks.len(),
        classification.video.len(),
        classification.audio.len(),
        classification.file_input_count
    );

    classification
}
