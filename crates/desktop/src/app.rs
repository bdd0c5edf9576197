use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::{
    button, column, container, pick_list, progress_bar, row, scrollable, text, Space,
};
use iced::{Element, Length, Subscription, Task, Theme};

use voicedesk_core::{
    format_progress, FfmpegExtractor, FileEntry, FileKind, Folder, JobKind, ProgressUpdate,
    TaskRunner, WhisperTranscriber, WorkerContext, WorkflowOrchestrator, WorkspaceLayout,
};

use crate::log_buffer::LogBuffer;
use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::workers::job_worker::{self, WorkerMessage};
use crate::workers::system_check::{self, SystemCheck};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    FolderSelected(Folder),
    FileSelected(PathBuf),
    Refresh,
    StartJob(JobKind),
    Stop,
    Poll,
    SelectBaseDir,
    BaseDirSelected(Option<PathBuf>),
    AppearanceChanged(Appearance),
    OpenSelected,
    OpenFolder,
    ClearLog,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    settings: Settings,
    layout: WorkspaceLayout,
    orchestrator: Arc<WorkflowOrchestrator>,
    active_folder: Folder,
    files: Vec<FileEntry>,
    selected: Option<PathBuf>,
    log: LogBuffer,
    progress: Option<ProgressUpdate>,
    worker: Option<Receiver<WorkerMessage>>,
    system_check: Option<Receiver<SystemCheck>>,
    system_status: Option<SystemCheck>,
    stopping: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let base = settings
            .base_dir
            .clone()
            .unwrap_or_else(default_base_dir);
        let layout = WorkspaceLayout::new(base);
        if let Err(e) = layout.ensure_dirs() {
            log::warn!("could not create working folders: {e}");
        }
        let orchestrator = build_orchestrator(layout.clone(), settings.model.clone());

        let mut app = Self {
            system_check: Some(system_check::spawn(settings.model.clone())),
            settings,
            layout,
            orchestrator,
            active_folder: Folder::Input,
            files: Vec::new(),
            selected: None,
            log: LogBuffer::new(),
            progress: None,
            worker: None,
            system_status: None,
            stopping: false,
        };
        app.refresh_files();
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FolderSelected(folder) => {
                self.active_folder = folder;
                self.selected = None;
                self.refresh_files();
            }
            Message::FileSelected(path) => {
                self.selected = Some(path);
            }
            Message::Refresh => {
                self.refresh_files();
            }
            Message::StartJob(kind) => {
                if self.worker.is_some() {
                    return Task::none();
                }
                let Some(input) = self.selected.clone() else {
                    self.log.line("Select a file first");
                    return Task::none();
                };
                let wanted = match kind {
                    JobKind::ExtractAudio | JobKind::FullCycle => FileKind::Video,
                    JobKind::Transcribe => FileKind::Audio,
                };
                if FileKind::of(&input) != Some(wanted) {
                    self.log
                        .line(&format!("{kind} needs a {} file", wanted.label().to_lowercase()));
                    return Task::none();
                }
                self.progress = None;
                self.stopping = false;
                self.worker = Some(job_worker::spawn(self.orchestrator.clone(), kind, input));
            }
            Message::Stop => {
                if self.worker.is_some() && !self.stopping {
                    self.stopping = true;
                    self.log.line("Stop requested");
                    // stop_all can block for the grace period, keep it
                    // off the UI thread
                    let orchestrator = self.orchestrator.clone();
                    thread::spawn(move || orchestrator.request_stop());
                }
            }
            Message::Poll => {
                self.poll_workers();
            }
            Message::SelectBaseDir => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select working folder")
                            .pick_folder()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::BaseDirSelected,
                );
            }
            Message::BaseDirSelected(Some(dir)) => {
                if self.worker.is_some() {
                    self.log.line("Finish or stop the running job first");
                    return Task::none();
                }
                self.settings.base_dir = Some(dir.clone());
                self.settings.save();
                self.layout = WorkspaceLayout::new(dir);
                if let Err(e) = self.layout.ensure_dirs() {
                    log::warn!("could not create working folders: {e}");
                }
                self.orchestrator =
                    build_orchestrator(self.layout.clone(), self.settings.model.clone());
                self.selected = None;
                self.refresh_files();
            }
            Message::BaseDirSelected(None) => {}
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::OpenSelected => {
                if let Some(path) = &self.selected {
                    let _ = open::that(path);
                }
            }
            Message::OpenFolder => {
                let _ = open::that(self.layout.dir(self.active_folder));
            }
            Message::ClearLog => {
                self.log.clear();
            }
        }
        Task::none()
    }

    fn poll_workers(&mut self) {
        let mut finished = false;
        if let Some(rx) = &self.worker {
            while let Ok(message) = rx.try_recv() {
                match message {
                    WorkerMessage::Line(line) => self.log.line(&line),
                    WorkerMessage::ProgressLine(line) => self.log.progress_line(&line),
                    WorkerMessage::Progress(update) => {
                        self.log.progress_line(&format_progress(&update));
                        self.progress = Some(update);
                    }
                    WorkerMessage::Finished(_) => finished = true,
                }
            }
        }
        if finished {
            self.worker = None;
            self.stopping = false;
            self.progress = None;
            self.refresh_files();
        }

        if let Some(rx) = &self.system_check {
            if let Ok(check) = rx.try_recv() {
                self.log.line(&check.summary());
                self.system_status = Some(check);
                self.system_check = None;
            }
        }
    }

    fn refresh_files(&mut self) {
        self.files = self
            .layout
            .list_files(self.active_folder)
            .unwrap_or_else(|e| {
                log::warn!("could not list files: {e}");
                Vec::new()
            });
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    pub fn view(&self) -> Element<'_, Message> {
        let folder_bar = row(Folder::ALL
            .iter()
            .map(|&folder| {
                let label = text(folder.label()).size(13);
                let btn = button(label)
                    .on_press(Message::FolderSelected(folder))
                    .padding([6, 14]);
                if folder == self.active_folder {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let folder_bar = row![
            folder_bar,
            Space::new().width(Length::Fill),
            button(text("Refresh").size(13))
                .on_press(Message::Refresh)
                .style(button::text),
            button(text("Open folder").size(13))
                .on_press(Message::OpenFolder)
                .style(button::text),
        ]
        .spacing(2);

        let file_list = container(scrollable(self.file_rows()).height(Length::Fill))
            .height(Length::FillPortion(3));

        let log_header = row![
            text("Log").size(11),
            Space::new().width(Length::Fill),
            button(text("Clear").size(11))
                .on_press(Message::ClearLog)
                .style(button::text),
        ]
        .align_y(iced::Alignment::Center);

        let log_view = container(
            column![
                log_header,
                scrollable(
                    column(
                        self.log
                            .lines()
                            .iter()
                            .map(|line| text(line.clone()).size(12).into())
                            .collect::<Vec<_>>(),
                    )
                    .spacing(2),
                )
                .anchor_bottom()
                .height(Length::Fill),
            ]
            .spacing(4),
        )
        .height(Length::FillPortion(2));

        let mut content = column![folder_bar, file_list, self.action_bar()];
        if let Some(update) = &self.progress {
            if let Some(total) = update.total {
                content = content.push(progress_bar(0.0..=total as f32, update.processed as f32));
            }
        }
        content
            .push(self.status_line())
            .push(log_view)
            .push(self.footer())
            .spacing(8)
            .padding(12)
            .height(Length::Fill)
            .into()
    }

    fn file_rows(&self) -> Element<'_, Message> {
        if self.files.is_empty() {
            return text("No files yet").size(13).into();
        }
        column(
            self.files
                .iter()
                .map(|entry| {
                    let is_selected = self.selected.as_deref() == Some(entry.path.as_path());
                    let content = row![
                        text(entry.file_name()).size(13).width(Length::Fill),
                        text(entry.kind.label()).size(11),
                        Space::new().width(12),
                        text(entry.size_label()).size(11),
                    ];
                    let btn = button(content)
                        .on_press(Message::FileSelected(entry.path.clone()))
                        .width(Length::Fill)
                        .padding([4, 8]);
                    if is_selected {
                        btn.style(button::primary).into()
                    } else {
                        btn.style(button::text).into()
                    }
                })
                .collect::<Vec<_>>(),
        )
        .spacing(1)
        .into()
    }

    fn action_bar(&self) -> Element<'_, Message> {
        let selected_kind = self.selected.as_deref().and_then(FileKind::of);
        let idle = self.worker.is_none();
        let video = idle && selected_kind == Some(FileKind::Video);
        let audio = idle && selected_kind == Some(FileKind::Audio);
        let is_text = selected_kind == Some(FileKind::Text);

        row![
            button(text("Extract audio").size(13))
                .on_press_maybe(video.then_some(Message::StartJob(JobKind::ExtractAudio))),
            button(text("Transcribe").size(13))
                .on_press_maybe(audio.then_some(Message::StartJob(JobKind::Transcribe))),
            button(text("Full cycle").size(13))
                .on_press_maybe(video.then_some(Message::StartJob(JobKind::FullCycle))),
            button(text("Open").size(13))
                .on_press_maybe(is_text.then_some(Message::OpenSelected)),
            Space::new().width(Length::Fill),
            button(text(if self.stopping { "Stopping" } else { "Stop" }).size(13))
                .on_press_maybe((!idle && !self.stopping).then_some(Message::Stop))
                .style(button::danger),
        ]
        .spacing(6)
        .into()
    }

    fn status_line(&self) -> Element<'_, Message> {
        let status = if let Some(update) = &self.progress {
            format_progress(update)
        } else if self.worker.is_some() {
            "Working".to_string()
        } else if let Some(check) = &self.system_status {
            check.summary()
        } else {
            "Checking system".to_string()
        };
        text(status).size(12).into()
    }

    fn footer(&self) -> Element<'_, Message> {
        row![
            text(self.layout.base().display().to_string()).size(11),
            button(text("Change folder").size(11))
                .on_press(Message::SelectBaseDir)
                .style(button::text),
            Space::new().width(Length::Fill),
            pick_list(
                Appearance::ALL,
                Some(self.settings.appearance),
                Message::AppearanceChanged,
            )
            .text_size(11),
        ]
        .spacing(6)
        .align_y(iced::Alignment::Center)
        .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.worker.is_some() || self.system_check.is_some() {
            iced::time::every(POLL_INTERVAL).map(|_| Message::Poll)
        } else {
            Subscription::none()
        }
    }
}

fn default_base_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("VoiceDesk"))
        .unwrap_or_else(|| PathBuf::from("VoiceDesk"))
}

fn build_orchestrator(layout: WorkspaceLayout, model: String) -> Arc<WorkflowOrchestrator> {
    let context = WorkerContext::new();
    let extractor = FfmpegExtractor::new(TaskRunner::new(context.registry().clone()));
    let transcriber = WhisperTranscriber::new(model);
    Arc::new(WorkflowOrchestrator::new(
        layout,
        context,
        Box::new(extractor),
        Box::new(transcriber),
    ))
}
