//! Puzzle data owned by the active round.

use crate::audio::AudioSource;
use crate::hints::HintKey;
use serde::{Deserialize, Serialize};

/// Raw catalog payload for one level's song, as the provider returns it.
///
/// Field-level schema belongs to the catalog collaborator; the engine only
/// requires these names.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    pub artists: String,
    pub album: String,
    pub year: u16,
    pub genre: String,
    /// Plain URL or embedded data-URI audio.
    pub audio: String,
    pub image_url: String,
}

/// The answer fields concealed during play and disclosed on reveal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerFields {
    pub title: String,
    pub performer: String,
    pub album: String,
    pub year: u16,
    pub genre: String,
}

/// One level's puzzle. Owned exclusively by the active round and replaced
/// wholesale on level load.
///
/// Answer fields stay concealed until [`Puzzle::reveal`]; [`Puzzle::answer`]
/// returns `None` before that.
#[derive(Clone, Debug, PartialEq)]
pub struct Puzzle {
    track_id: String,
    source: AudioSource,
    cover_url: String,
    year: u16,
    genre: String,
    album: String,
    artist: String,
    teaser: String,
    concealed: AnswerFields,
    revealed: Option<AnswerFields>,
}

impl Puzzle {
    #[must_use]
    pub fn from_record(record: SongRecord) -> Self {
        let teaser = title_teaser(&record.title);
        let concealed = AnswerFields {
            title: record.title,
            performer: record.artists.clone(),
            album: record.album.clone(),
            year: record.year,
            genre: record.genre.clone(),
        };
        Self {
            track_id: record.id,
            source: AudioSource::classify(record.audio),
            cover_url: record.image_url,
            year: record.year,
            genre: record.genre,
            album: record.album,
            artist: record.artists,
            teaser,
            concealed,
            revealed: None,
        }
    }

    #[must_use]
    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    #[must_use]
    pub const fn source(&self) -> &AudioSource {
        &self.source
    }

    #[must_use]
    pub fn cover_url(&self) -> &str {
        &self.cover_url
    }

    /// Display value for a revealed hint.
    #[must_use]
    pub fn hint_value(&self, key: HintKey) -> String {
        match key {
            HintKey::Year => self.year.to_string(),
            HintKey::Genre => self.genre.clone(),
            HintKey::Album => self.album.clone(),
            HintKey::Artist => self.artist.clone(),
            HintKey::TitleTeaser => self.teaser.clone(),
        }
    }

    /// Merge the answer into the visible puzzle. Canonical fields returned
    /// by the judge win over the concealed copy when present.
    pub fn reveal(&mut self, canonical: Option<AnswerFields>) {
        if self.revealed.is_none() {
            self.revealed = Some(canonical.unwrap_or_else(|| self.concealed.clone()));
        }
    }

    /// The revealed answer, or `None` while play is still in progress.
    #[must_use]
    pub const fn answer(&self) -> Option<&AnswerFields> {
        self.revealed.as_ref()
    }
}

/// Client-side title teaser: the leading half of the title's characters
/// followed by an ellipsis.
fn title_teaser(title: &str) -> String {
    let chars: Vec<char> = title.chars().collect();
    let mut teaser: String = chars[..chars.len() / 2].iter().collect();
    teaser.push('…');
    teaser
}
