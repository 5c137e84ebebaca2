//! Shared test utilities for the quran-json test suite.
//!
//! Provides a two-chapter fixture `data/` tree (chapter 1 with 3 verses,
//! chapter 2 with 4) covering every source the build stage reads: English
//! and Hausa chapter metadata, the base Uthmani text, and transliteration
//! plus translation editions. Tests get an isolated copy in a `TempDir`
//! they can mutate freely.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::sources::{ChapterMeta, SourceVerse, VersesByChapter};
use crate::types::ChapterType;

/// Verse counts of the fixture chapters.
pub const FIXTURE_CHAPTERS: [(u32, usize); 2] = [(1, 3), (2, 4)];

/// Build the full fixture `data/` tree in a fresh temp directory.
pub fn fixture_data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_fixture_data(tmp.path());
    tmp
}

/// Write the fixture `data/` tree under `root`.
pub fn write_fixture_data(root: &Path) {
    fs::create_dir_all(root.join("chapters")).unwrap();
    fs::create_dir_all(root.join("editions")).unwrap();

    write_json(&root.join("chapters/en.json"), &en_chapter_metadata());
    write_json(&root.join("chapters/ha_gumi.json"), &ha_chapter_metadata());
    write_json(&root.join("quran.json"), &verse_rows(&BASE_TEXT));
    write_json(
        &root.join("editions/transliteration.json"),
        &verse_rows(&TRANSLITERATION_TEXT),
    );
    write_json(&root.join("editions/en.json"), &verse_rows(&EN_TEXT));
    write_json(&root.join("editions/ha_gumi.json"), &verse_rows(&HA_TEXT));
}

/// Generic verse rows for alignment tests.
pub fn sample_verses(chapter: u32, count: usize) -> Vec<SourceVerse> {
    (1..=count as u32)
        .map(|verse| SourceVerse {
            chapter,
            verse,
            text: format!("chapter {chapter} verse {verse}"),
        })
        .collect()
}

/// Tajweed markup rows matching a fixture chapter's verse count.
pub fn fixture_tajweed(chapter: u32) -> Vec<String> {
    let (_, count) = FIXTURE_CHAPTERS
        .iter()
        .find(|(id, _)| *id == chapter)
        .copied()
        .unwrap();
    (1..=count)
        .map(|verse| format!("[h:{chapter}:{verse}[tajweed text]]"))
        .collect()
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn en_chapter_metadata() -> Vec<ChapterMeta> {
    vec![
        ChapterMeta {
            id: 1,
            name: "الفاتحة".to_string(),
            transliteration: "Al-Fatihah".to_string(),
            translation: "The Opener".to_string(),
            kind: ChapterType::Meccan,
            total_verses: 3,
        },
        ChapterMeta {
            id: 2,
            name: "البقرة".to_string(),
            transliteration: "Al-Baqarah".to_string(),
            translation: "The Cow".to_string(),
            kind: ChapterType::Medinan,
            total_verses: 4,
        },
    ]
}

fn ha_chapter_metadata() -> Vec<ChapterMeta> {
    let mut metas = en_chapter_metadata();
    metas[0].translation = "Mabudiya".to_string();
    metas[1].translation = "Saniya".to_string();
    metas
}

const BASE_TEXT: [&[&str]; 2] = [
    &[
        "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ",
        "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ",
        "الرَّحْمَٰنِ الرَّحِيمِ",
    ],
    &[
        "الم",
        "ذَٰلِكَ الْكِتَابُ لَا رَيْبَ فِيهِ",
        "هُدًى لِلْمُتَّقِينَ",
        "الَّذِينَ يُؤْمِنُونَ بِالْغَيْبِ",
    ],
];

const TRANSLITERATION_TEXT: [&[&str]; 2] = [
    &[
        "Bismillaahir Rahmaanir Raheem",
        "Alhamdu lillaahi Rabbil 'aalameen",
        "Ar-Rahmaanir-Raheem",
    ],
    &[
        "Alif-Laaam-Meeem",
        "Zaalikal Kitaabu laa raiba feeh",
        "hudal lilmuttaqeen",
        "Allazeena yu'minoona bilghaib",
    ],
];

const EN_TEXT: [&[&str]; 2] = [
    &[
        "In the name of Allah, the Entirely Merciful, the Especially Merciful.",
        "All praise is due to Allah, Lord of the worlds.",
        "The Entirely Merciful, the Especially Merciful.",
    ],
    &[
        "Alif, Lam, Meem.",
        "This is the Book about which there is no doubt.",
        "A guidance for those conscious of Allah.",
        "Who believe in the unseen.",
    ],
];

const HA_TEXT: [&[&str]; 2] = [
    &[
        "Da sunan Allah, Mai rahama, Mai jin kai.",
        "Godiya ta tabbata ga Allah, Ubangijin talikai.",
        "Mai rahama, Mai jin kai.",
    ],
    &[
        "A. L. M.",
        "Wancan ne Littafi, babu shakka a cikinsa.",
        "Shiriya ne ga masu taqawa.",
        "Wadanda suke yin imani da gaibi.",
    ],
];

fn verse_rows(texts: &[&[&str]; 2]) -> VersesByChapter {
    texts
        .iter()
        .enumerate()
        .map(|(idx, verses)| {
            let chapter = idx as u32 + 1;
            let rows = verses
                .iter()
                .enumerate()
                .map(|(v, text)| SourceVerse {
                    chapter,
                    verse: v as u32 + 1,
                    text: (*text).to_string(),
                })
                .collect();
            (chapter, rows)
        })
        .collect()
}
