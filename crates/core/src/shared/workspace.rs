use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::shared::constants::{
    AUDIO_EXTENSIONS, EXTRACTED_AUDIO_EXTENSION, EXTRACTED_AUDIO_SUFFIX, TEXT_EXTENSIONS,
    VIDEO_EXTENSIONS,
};

/// What a file in the workspace is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Audio,
    Text,
}

impl FileKind {
    pub fn of(path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let ext = ext.as_str();
        if VIDEO_EXTENSIONS.contains(&ext) {
            Some(FileKind::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Some(FileKind::Audio)
        } else if TEXT_EXTENSIONS.contains(&ext) {
            Some(FileKind::Text)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Video => "Video",
            FileKind::Audio => "Audio",
            FileKind::Text => "Text",
        }
    }
}

/// One of the four working folders shown in the file browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Input,
    Audio,
    Transcripts,
    Output,
}

impl Folder {
    pub const ALL: &[Folder] = &[
        Folder::Input,
        Folder::Audio,
        Folder::Transcripts,
        Folder::Output,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Folder::Input => "input",
            Folder::Audio => "audio",
            Folder::Transcripts => "transcripts",
            Folder::Output => "output",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Folder::Input => "Video files",
            Folder::Audio => "Audio files",
            Folder::Transcripts => "Transcripts",
            Folder::Output => "Results",
        }
    }
}

/// A recognized file inside one of the working folders.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub kind: FileKind,
    pub size: u64,
}

impl FileEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Human-readable size, matching the browser column ("3 MB", "12 KB").
    pub fn size_label(&self) -> String {
        if self.size > 1024 * 1024 {
            format!("{} MB", self.size / 1024 / 1024)
        } else {
            format!("{} KB", self.size / 1024)
        }
    }
}

/// The four sibling working directories under one base directory:
/// `input` (video), `audio` (intermediate), `transcripts` (final text),
/// `output` (other results).
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    base: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn dir(&self, folder: Folder) -> PathBuf {
        self.base.join(folder.dir_name())
    }

    pub fn input_dir(&self) -> PathBuf {
        self.dir(Folder::Input)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.dir(Folder::Audio)
    }

    pub fn transcripts_dir(&self) -> PathBuf {
        self.dir(Folder::Transcripts)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir(Folder::Output)
    }

    /// Create any missing working directories.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for folder in Folder::ALL {
            fs::create_dir_all(self.dir(*folder))?;
        }
        Ok(())
    }

    /// Where the extracted audio for a video lands: `audio/<stem>_audio.m4a`.
    pub fn extracted_audio_path(&self, video: &Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.audio_dir().join(format!(
            "{stem}{EXTRACTED_AUDIO_SUFFIX}.{EXTRACTED_AUDIO_EXTENSION}"
        ))
    }

    /// Where the finished transcript for an audio file lands:
    /// `transcripts/<stem>.txt`.
    pub fn transcript_target(&self, audio: &Path) -> PathBuf {
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.transcripts_dir().join(format!("{stem}.txt"))
    }

    /// List recognized files in a folder, newest first.
    pub fn list_files(&self, folder: Folder) -> io::Result<Vec<FileEntry>> {
        let dir = self.dir(folder);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<(FileEntry, SystemTime)> = Vec::new();
        for dir_entry in fs::read_dir(&dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(kind) = FileKind::of(&path) else {
                continue;
            };
            let metadata = dir_entry.metadata()?;
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((
                FileEntry {
                    path,
                    kind,
                    size: metadata.len(),
                },
                modified,
            ));
        }

        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries.into_iter().map(|(entry, _)| entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("clip.mp4", Some(FileKind::Video))]
    #[case("clip.MKV", Some(FileKind::Video))]
    #[case("voice.m4a", Some(FileKind::Audio))]
    #[case("voice.ogg", Some(FileKind::Audio))]
    #[case("notes.txt", Some(FileKind::Text))]
    #[case("archive.zip", None)]
    #[case("no_extension", None)]
    fn test_file_kind_by_extension(#[case] name: &str, #[case] expected: Option<FileKind>) {
        assert_eq!(FileKind::of(Path::new(name)), expected);
    }

    #[test]
    fn test_extracted_audio_path() {
        let layout = WorkspaceLayout::new("/base");
        let path = layout.extracted_audio_path(Path::new("/base/input/sample.mp4"));
        assert_eq!(path, PathBuf::from("/base/audio/sample_audio.m4a"));
    }

    #[test]
    fn test_transcript_target() {
        let layout = WorkspaceLayout::new("/base");
        let path = layout.transcript_target(Path::new("/base/audio/sample_audio.m4a"));
        assert_eq!(path, PathBuf::from("/base/transcripts/sample_audio.txt"));
    }

    #[test]
    fn test_ensure_dirs_creates_all_four() {
        let tmp = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        layout.ensure_dirs().unwrap();
        for folder in Folder::ALL {
            assert!(layout.dir(*folder).is_dir(), "{:?} missing", folder);
        }
        // Idempotent
        layout.ensure_dirs().unwrap();
    }

    #[test]
    fn test_list_files_skips_unrecognized() {
        let tmp = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        layout.ensure_dirs().unwrap();
        fs::write(layout.input_dir().join("a.mp4"), b"x").unwrap();
        fs::write(layout.input_dir().join("b.zip"), b"x").unwrap();
        fs::create_dir(layout.input_dir().join("sub.mp4")).unwrap();

        let entries = layout.list_files(Folder::Input).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "a.mp4");
        assert_eq!(entries[0].kind, FileKind::Video);
    }

    #[test]
    fn test_list_files_missing_dir_is_empty() {
        let layout = WorkspaceLayout::new("/definitely/not/here");
        assert!(layout.list_files(Folder::Audio).unwrap().is_empty());
    }

    #[test]
    fn test_size_label() {
        let entry = FileEntry {
            path: PathBuf::from("a.mp4"),
            kind: FileKind::Video,
            size: 3 * 1024 * 1024,
        };
        assert_eq!(entry.size_label(), "3 MB");
        let small = FileEntry {
            path: PathBuf::from("b.txt"),
            kind: FileKind::Text,
            size: 2048,
        };
        assert_eq!(small.size_label(), "2 KB");
    }
}
