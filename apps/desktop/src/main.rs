use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use iced::widget::{
    Column, button, column, container, horizontal_rule, pick_list, row, scrollable, text,
};
use iced::{Alignment, Color, Element, Font, Length, Task, font};
use scenelens_core::{
    AnalysisResult, AnalysisService, BlockView, HttpAnalysisService, Layout, PaletteColor,
    PendingFile, ResultSession, ServiceConfig, SubmissionState, TranscriptSection, VideoPreview,
    Workflow, logging, service::VIDEO_EXTENSIONS,
};
use tracing::warn;
use uuid::Uuid;

const IN_FLIGHT_MESSAGE: &str =
    "Uploading and analyzing... Depending on the file size, it might take a few minutes to 1 hour.";
const ERROR_COLOR: Color = Color {
    r: 0.83,
    g: 0.18,
    b: 0.18,
    a: 1.0,
};

fn main() -> iced::Result {
    if let Err(e) = logging::init() {
        eprintln!("warning: {e}");
    }
    iced::application("SceneLens", App::update, App::view).run_with(App::new)
}

struct App {
    workflow: Workflow,
    service: Option<HttpAnalysisService>,
    /// Blocking notice shown above the form, e.g. a missing file at submit time.
    notice: Option<String>,
    video_preview: Option<VideoPreview>,
}

/// Entry of the scene selector.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SceneChoice {
    index: usize,
    title: String,
}

impl std::fmt::Display for SceneChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone)]
enum Message {
    PickVideo,
    PickSchema,
    VideoPicked(Option<PathBuf>),
    SchemaPicked(Option<PathBuf>),
    Analyze,
    Analyzed(Uuid, Result<Arc<AnalysisResult>, String>),
    SceneSelected(SceneChoice),
    PreviousScene,
    NextScene,
    OpenVideo,
    DismissNotice,
    DismissError,
}

async fn pick_video() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Choose a video file")
        .add_filter("Video", &VIDEO_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

async fn pick_schema() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Choose an Analyzer schema file")
        .add_filter("JSON", &["json"])
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Hand the video to the platform's default player.
fn open_in_player(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = Command::new("xdg-open");

    command.arg(path).spawn().map(|_| ())
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let service =
            ServiceConfig::resolve(None).and_then(|config| HttpAnalysisService::new(&config));
        let app = match service {
            Ok(service) => Self::with_service(Some(service), None),
            Err(e) => {
                warn!(error = %e, "analysis service is not configured");
                Self::with_service(None, Some(e.to_string()))
            }
        };
        (app, Task::none())
    }

    fn with_service(service: Option<HttpAnalysisService>, notice: Option<String>) -> Self {
        Self {
            workflow: Workflow::new(),
            service,
            notice,
            video_preview: None,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickVideo => return Task::perform(pick_video(), Message::VideoPicked),
            Message::PickSchema => return Task::perform(pick_schema(), Message::SchemaPicked),
            Message::VideoPicked(Some(path)) => {
                let video = PendingFile::new(path);
                self.video_preview = Some(VideoPreview::of(&video));
                self.workflow.select_video(video);
            }
            Message::SchemaPicked(Some(path)) => {
                self.workflow.select_schema(PendingFile::new(path))
            }
            Message::VideoPicked(None) | Message::SchemaPicked(None) => {}
            Message::Analyze => return self.analyze(),
            Message::Analyzed(id, outcome) => {
                self.workflow.complete(id, outcome);
            }
            Message::SceneSelected(choice) => {
                if let Err(e) = self.workflow.select(choice.index) {
                    self.notice = Some(e.to_string());
                }
            }
            Message::PreviousScene => {
                self.workflow.select_previous();
            }
            Message::NextScene => {
                self.workflow.select_next();
            }
            Message::OpenVideo => self.open_video(),
            Message::DismissNotice => self.notice = None,
            Message::DismissError => self.workflow.dismiss_error(),
        }
        Task::none()
    }

    fn open_video(&mut self) {
        let Some(video) = self.workflow.video() else {
            return;
        };
        if let Err(e) = open_in_player(video.path()) {
            warn!(error = %e, path = %video.path().display(), "could not open video");
            self.notice = Some(format!("Could not open {}: {e}", video.file_name()));
        }
    }

    fn analyze(&mut self) -> Task<Message> {
        let Some(service) = self.service.clone() else {
            self.notice = Some("The analysis service is not configured.".to_string());
            return Task::none();
        };

        match self.workflow.begin_submit() {
            Ok(submission) => {
                self.notice = None;
                let id = submission.id;
                Task::perform(
                    async move {
                        service
                            .analyze(submission.request)
                            .await
                            .map(Arc::new)
                            .map_err(|e| e.to_string())
                    },
                    move |outcome| Message::Analyzed(id, outcome),
                )
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let header = container(text("Content Understanding").size(30))
            .padding(20)
            .width(Length::Fill);

        let body: Element<'_, Message> = match (self.workflow.layout(), self.workflow.session()) {
            (Layout::Split, Some(session)) => row![
                container(self.upload_panel()).width(Length::FillPortion(1)),
                container(results_panel(session)).width(Length::FillPortion(1)),
            ]
            .spacing(24)
            .padding(20)
            .into(),
            _ => container(container(self.upload_panel()).max_width(640.0))
                .center_x(Length::Fill)
                .padding(20)
                .into(),
        };

        column![header, body].into()
    }

    fn upload_panel(&self) -> Element<'_, Message> {
        let analyze = button(text("Analyze File"))
            .on_press_maybe(self.workflow.can_submit().then_some(Message::Analyze))
            .width(Length::Fill)
            .padding(12);

        let progress = self
            .workflow
            .is_in_flight()
            .then(|| text(IN_FLIGHT_MESSAGE));

        let failure = match self.workflow.state() {
            SubmissionState::Failed { message } => Some(
                row![
                    text(format!("Analysis failed: {message}")).color(ERROR_COLOR),
                    button(text("Dismiss")).on_press(Message::DismissError),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            ),
            _ => None,
        };

        let notice = self.notice.as_ref().map(|notice| {
            row![
                text(notice.clone()).color(ERROR_COLOR),
                button(text("OK")).on_press(Message::DismissNotice),
            ]
            .spacing(12)
            .align_y(Alignment::Center)
        });

        let preview = self.video_preview.as_ref().map(|preview| {
            column![
                text("Video Preview").size(18),
                row![
                    text(preview.to_string()),
                    button(text("Open in player")).on_press(Message::OpenVideo),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            ]
            .spacing(6)
        });

        Column::new()
            .spacing(16)
            .push(text("Upload and Analyze Video").size(26))
            .push_maybe(notice)
            .push(file_row(
                "Choose a video file",
                self.workflow.video(),
                Message::PickVideo,
            ))
            .push_maybe(preview)
            .push(file_row(
                "Choose an Analyzer schema file",
                self.workflow.schema(),
                Message::PickSchema,
            ))
            .push(analyze)
            .push_maybe(progress)
            .push_maybe(failure)
            .into()
    }
}

fn file_row<'a>(
    label: &'a str,
    file: Option<&PendingFile>,
    on_press: Message,
) -> Element<'a, Message> {
    let chosen = file
        .map(PendingFile::file_name)
        .unwrap_or_else(|| "No file chosen".to_string());

    column![
        text(label).size(14),
        row![button(text("Browse…")).on_press(on_press), text(chosen)]
            .spacing(12)
            .align_y(Alignment::Center),
    ]
    .spacing(6)
    .into()
}

fn scene_choices(session: &ResultSession) -> Vec<SceneChoice> {
    session
        .block_titles()
        .into_iter()
        .enumerate()
        .map(|(index, title)| SceneChoice { index, title })
        .collect()
}

fn results_panel(session: &ResultSession) -> Element<'_, Message> {
    let choices = scene_choices(session);
    let selected = session
        .selection()
        .current()
        .and_then(|index| choices.get(index).cloned());

    let current = session.selection().current();
    let len = session.selection().len();
    let selector = row![
        button(text("‹ Previous"))
            .on_press_maybe(current.is_some_and(|i| i > 0).then_some(Message::PreviousScene)),
        pick_list(choices, selected, Message::SceneSelected)
            .placeholder("Select Scene")
            .width(Length::Fill),
        button(text("Next ›"))
            .on_press_maybe(current.is_some_and(|i| i + 1 < len).then_some(Message::NextScene)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let fields: Element<'_, Message> = match session.selected_view() {
        Some(view) => block_fields(view),
        None => text("The service returned no content blocks.").into(),
    };

    let transcripts =
        Column::with_children(session.transcripts().into_iter().map(transcript_section))
            .spacing(12);

    scrollable(
        column![
            text("Video Analysis Results").size(24),
            text("Select Scene").size(14),
            selector,
            fields,
            horizontal_rule(1),
            scrollable(transcripts).height(Length::Fixed(300.0)),
        ]
        .spacing(12),
    )
    .height(Length::Fill)
    .into()
}

fn palette_color(color: PaletteColor) -> Color {
    let (r, g, b) = color.rgb;
    Color::from_rgb8(r, g, b)
}

fn block_fields(view: BlockView) -> Element<'static, Message> {
    let bold = Font {
        weight: font::Weight::Bold,
        ..Font::DEFAULT
    };

    view.fields
        .into_iter()
        .fold(
            Column::new().spacing(8).push(text(view.title).size(18).font(bold)),
            |col, field| {
                col.push(
                    row![
                        text(format!("{}:", field.name))
                            .color(palette_color(field.color))
                            .font(bold),
                        text(field.value),
                    ]
                    .spacing(6),
                )
            },
        )
        .into()
}

fn transcript_section(section: TranscriptSection) -> Element<'static, Message> {
    column![
        text(section.heading).size(18),
        text(section.text),
        horizontal_rule(1),
    ]
    .spacing(6)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let service = HttpAnalysisService::new(&ServiceConfig::default()).unwrap();
        App::with_service(Some(service), None)
    }

    fn in_flight_id(app: &App) -> Uuid {
        match app.workflow.state() {
            SubmissionState::InFlight { id } => *id,
            other => panic!("not in flight: {other:?}"),
        }
    }

    fn two_scenes() -> Arc<AnalysisResult> {
        Arc::new(
            serde_json::from_str(
                r#"{"contents": [{"fields": {"a": {"valueString": "x"}}}, {"markdown": "hi"}]}"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn analyze_without_schema_shows_notice() {
        let mut app = app();
        let _ = app.update(Message::VideoPicked(Some(PathBuf::from("clip.mp4"))));
        let _ = app.update(Message::Analyze);

        assert!(app.notice.as_deref().unwrap().contains("schema file"));
        assert_eq!(app.workflow.state(), &SubmissionState::Idle);
    }

    #[test]
    fn cancelled_picker_keeps_selection() {
        let mut app = app();
        let _ = app.update(Message::VideoPicked(Some(PathBuf::from("clip.mp4"))));
        let _ = app.update(Message::VideoPicked(None));
        assert_eq!(app.workflow.video().unwrap().file_name(), "clip.mp4");
    }

    #[test]
    fn analysis_round_trip_switches_layout() {
        let mut app = app();
        let _ = app.update(Message::VideoPicked(Some(PathBuf::from("clip.mp4"))));
        let _ = app.update(Message::SchemaPicked(Some(PathBuf::from("schema.json"))));
        let _ = app.update(Message::Analyze);
        assert!(!app.workflow.can_submit());

        let id = in_flight_id(&app);
        let _ = app.update(Message::Analyzed(id, Ok(two_scenes())));
        assert_eq!(app.workflow.layout(), Layout::Split);

        let _ = app.update(Message::SceneSelected(SceneChoice {
            index: 1,
            title: "Content 2".to_string(),
        }));
        let session = app.workflow.session().unwrap();
        assert_eq!(session.selection().current(), Some(1));
        assert_eq!(
            scene_choices(session)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["Content 1", "Content 2"]
        );
    }

    #[test]
    fn previous_and_next_step_through_scenes() {
        let mut app = app();
        let _ = app.update(Message::VideoPicked(Some(PathBuf::from("clip.mp4"))));
        let _ = app.update(Message::SchemaPicked(Some(PathBuf::from("schema.json"))));
        let _ = app.update(Message::Analyze);
        let id = in_flight_id(&app);
        let _ = app.update(Message::Analyzed(id, Ok(two_scenes())));

        let current = |app: &App| app.workflow.session().unwrap().selection().current();
        let _ = app.update(Message::PreviousScene);
        assert_eq!(current(&app), Some(0));
        let _ = app.update(Message::NextScene);
        assert_eq!(current(&app), Some(1));
        let _ = app.update(Message::NextScene);
        assert_eq!(current(&app), Some(1));
        let _ = app.update(Message::PreviousScene);
        assert_eq!(current(&app), Some(0));
    }

    #[test]
    fn picking_a_video_shows_its_preview() {
        let mut app = app();
        assert!(app.video_preview.is_none());

        let _ = app.update(Message::VideoPicked(Some(PathBuf::from("/nonexistent/talk.mov"))));
        let preview = app.video_preview.as_ref().unwrap();
        assert_eq!(preview.file_name, "talk.mov");
        assert_eq!(preview.mime, "video/quicktime");

        let _ = app.update(Message::VideoPicked(None));
        assert_eq!(app.video_preview.as_ref().unwrap().file_name, "talk.mov");
    }

    #[test]
    fn failed_analysis_can_be_dismissed() {
        let mut app = app();
        let _ = app.update(Message::VideoPicked(Some(PathBuf::from("clip.mp4"))));
        let _ = app.update(Message::SchemaPicked(Some(PathBuf::from("schema.json"))));
        let _ = app.update(Message::Analyze);

        let id = in_flight_id(&app);
        let _ = app.update(Message::Analyzed(id, Err("connection refused".to_string())));
        assert!(matches!(app.workflow.state(), SubmissionState::Failed { .. }));
        assert_eq!(app.workflow.layout(), Layout::UploadOnly);

        let _ = app.update(Message::DismissError);
        assert_eq!(app.workflow.state(), &SubmissionState::Idle);
    }
}
