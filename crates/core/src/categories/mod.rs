//! Standard (Newznab) category taxonomy and per-site category mapping.
//!
//! Every site adapter registers its own category tokens against this
//! taxonomy at construction time so that searches and results can be
//! expressed uniformly across sites.

mod mapping;

pub use mapping::{CategoryMap, CategoryMapping};

use serde::{Deserialize, Deserializer, Serialize};

/// A category in the standard taxonomy.
///
/// Top-level categories have ids that are multiples of 1000; subcategories
/// share the thousand prefix of their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StandardCategory {
    pub id: u32,
    pub name: &'static str,
}

impl StandardCategory {
    pub const CONSOLE: Self = Self::new(1000, "Console");
    pub const CONSOLE_NDS: Self = Self::new(1010, "Console/NDS");
    pub const CONSOLE_PSP: Self = Self::new(1020, "Console/PSP");
    pub const CONSOLE_WII: Self = Self::new(1030, "Console/Wii");
    pub const CONSOLE_XBOX: Self = Self::new(1040, "Console/XBox");
    pub const CONSOLE_XBOX360: Self = Self::new(1050, "Console/XBox 360");
    pub const CONSOLE_PS3: Self = Self::new(1080, "Console/PS3");
    pub const CONSOLE_OTHER: Self = Self::new(1090, "Console/Other");
    pub const CONSOLE_PS4: Self = Self::new(1180, "Console/PS4");

    pub const MOVIES: Self = Self::new(2000, "Movies");
    pub const MOVIES_FOREIGN: Self = Self::new(2010, "Movies/Foreign");
    pub const MOVIES_OTHER: Self = Self::new(2020, "Movies/Other");
    pub const MOVIES_SD: Self = Self::new(2030, "Movies/SD");
    pub const MOVIES_HD: Self = Self::new(2040, "Movies/HD");
    pub const MOVIES_UHD: Self = Self::new(2045, "Movies/UHD");
    pub const MOVIES_BLURAY: Self = Self::new(2050, "Movies/BluRay");
    pub const MOVIES_3D: Self = Self::new(2060, "Movies/3D");
    pub const MOVIES_DVD: Self = Self::new(2070, "Movies/DVD");
    pub const MOVIES_WEBDL: Self = Self::new(2080, "Movies/WEB-DL");

    pub const AUDIO: Self = Self::new(3000, "Audio");
    pub const AUDIO_MP3: Self = Self::new(3010, "Audio/MP3");
    pub const AUDIO_VIDEO: Self = Self::new(3020, "Audio/Video");
    pub const AUDIO_AUDIOBOOK: Self = Self::new(3030, "Audio/Audiobook");
    pub const AUDIO_LOSSLESS: Self = Self::new(3040, "Audio/Lossless");
    pub const AUDIO_OTHER: Self = Self::new(3050, "Audio/Other");
    pub const AUDIO_FOREIGN: Self = Self::new(3060, "Audio/Foreign");

    pub const PC: Self = Self::new(4000, "PC");
    pub const PC_0DAY: Self = Self::new(4010, "PC/0day");
    pub const PC_ISO: Self = Self::new(4020, "PC/ISO");
    pub const PC_MAC: Self = Self::new(4030, "PC/Mac");
    pub const PC_MOBILE_OTHER: Self = Self::new(4040, "PC/Mobile-Other");
    pub const PC_GAMES: Self = Self::new(4050, "PC/Games");

    pub const TV: Self = Self::new(5000, "TV");
    pub const TV_WEBDL: Self = Self::new(5010, "TV/WEB-DL");
    pub const TV_FOREIGN: Self = Self::new(5020, "TV/Foreign");
    pub const TV_SD: Self = Self::new(5030, "TV/SD");
    pub const TV_HD: Self = Self::new(5040, "TV/HD");
    pub const TV_UHD: Self = Self::new(5045, "TV/UHD");
    pub const TV_OTHER: Self = Self::new(5050, "TV/Other");
    pub const TV_SPORT: Self = Self::new(5060, "TV/Sport");
    pub const TV_ANIME: Self = Self::new(5070, "TV/Anime");
    pub const TV_DOCUMENTARY: Self = Self::new(5080, "TV/Documentary");

    pub const XXX: Self = Self::new(6000, "XXX");

    pub const BOOKS: Self = Self::new(7000, "Books");
    pub const BOOKS_MAGS: Self = Self::new(7010, "Books/Mags");
    pub const BOOKS_EBOOK: Self = Self::new(7020, "Books/EBook");
    pub const BOOKS_COMICS: Self = Self::new(7030, "Books/Comics");
    pub const BOOKS_TECHNICAL: Self = Self::new(7040, "Books/Technical");
    pub const BOOKS_OTHER: Self = Self::new(7050, "Books/Other");
    pub const BOOKS_FOREIGN: Self = Self::new(7060, "Books/Foreign");

    pub const OTHER: Self = Self::new(8000, "Other");
    pub const OTHER_MISC: Self = Self::new(8010, "Other/Misc");
    pub const OTHER_HASHED: Self = Self::new(8020, "Other/Hashed");

    const fn new(id: u32, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Look up a category by its numeric id.
    pub fn from_id(id: u32) -> Option<Self> {
        ALL_CATEGORIES.iter().copied().find(|c| c.id == id)
    }

    /// Whether this is a top-level category.
    pub fn is_parent(&self) -> bool {
        self.id % 1000 == 0
    }

    /// The top-level category this one belongs to (itself for parents).
    pub fn parent(&self) -> Option<Self> {
        Self::from_id(self.id / 1000 * 1000)
    }

    /// All subcategories of this category (empty for subcategories).
    pub fn subcategories(&self) -> impl Iterator<Item = Self> + '_ {
        let prefix = self.id / 1000;
        let is_parent = self.is_parent();
        ALL_CATEGORIES
            .iter()
            .copied()
            .filter(move |c| is_parent && c.id != self.id && c.id / 1000 == prefix)
    }
}

impl<'de> Deserialize<'de> for StandardCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Id(u32),
            Object { id: u32 },
        }

        let id = match Repr::deserialize(deserializer)? {
            Repr::Id(id) | Repr::Object { id } => id,
        };
        Self::from_id(id)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown category id {}", id)))
    }
}

/// Every category in the standard taxonomy.
pub const ALL_CATEGORIES: &[StandardCategory] = &[
    StandardCategory::CONSOLE,
    StandardCategory::CONSOLE_NDS,
    StandardCategory::CONSOLE_PSP,
    StandardCategory::CONSOLE_WII,
    StandardCategory::CONSOLE_XBOX,
    StandardCategory::CONSOLE_XBOX360,
    StandardCategory::CONSOLE_PS3,
    StandardCategory::CONSOLE_OTHER,
    StandardCategory::CONSOLE_PS4,
    StandardCategory::MOVIES,
    StandardCategory::MOVIES_FOREIGN,
    StandardCategory::MOVIES_OTHER,
    StandardCategory::MOVIES_SD,
    StandardCategory::MOVIES_HD,
    StandardCategory::MOVIES_UHD,
    StandardCategory::MOVIES_BLURAY,
    StandardCategory::MOVIES_3D,
    StandardCategory::MOVIES_DVD,
    StandardCategory::MOVIES_WEBDL,
    StandardCategory::AUDIO,
    StandardCategory::AUDIO_MP3,
    StandardCategory::AUDIO_VIDEO,
    StandardCategory::AUDIO_AUDIOBOOK,
    StandardCategory::AUDIO_LOSSLESS,
    StandardCategory::AUDIO_OTHER,
    StandardCategory::AUDIO_FOREIGN,
    StandardCategory::PC,
    StandardCategory::PC_0DAY,
    StandardCategory::PC_ISO,
    StandardCategory::PC_MAC,
    StandardCategory::PC_MOBILE_OTHER,
    StandardCategory::PC_GAMES,
    StandardCategory::TV,
    StandardCategory::TV_WEBDL,
    StandardCategory::TV_FOREIGN,
    StandardCategory::TV_SD,
    StandardCategory::TV_HD,
    StandardCategory::TV_UHD,
    StandardCategory::TV_OTHER,
    StandardCategory::TV_SPORT,
    StandardCategory::TV_ANIME,
    StandardCategory::TV_DOCUMENTARY,
    StandardCategory::XXX,
    StandardCategory::BOOKS,
    StandardCategory::BOOKS_MAGS,
    StandardCategory::BOOKS_EBOOK,
    StandardCategory::BOOKS_COMICS,
    StandardCategory::BOOKS_TECHNICAL,
    StandardCategory::BOOKS_OTHER,
    StandardCategory::BOOKS_FOREIGN,
    StandardCategory::OTHER,
    StandardCategory::OTHER_MISC,
    StandardCategory::OTHER_HASHED,
];
