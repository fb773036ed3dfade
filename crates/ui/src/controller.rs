//! Cooperative main loop.
//!
//! One task owns storage, the catalog, and the open session, and
//! serializes everything: an input action is handled to completion
//! (including any indexing pass and redraw) before the next one is
//! looked at. There is no other mutator, so no locking anywhere.

use book::catalog::{Catalog, CatalogError};
use book::index::IndexError;
use book::session::{PageTurn, ReaderSession, SessionError};
use book::store;
use platform::config::PageGrid;
use platform::input::{InputDevice, ReaderAction};
use platform::present::{ListRow, PageView, Presenter};
use platform::storage::{File, Storage};

use crate::browse::Browse;
use crate::screen::Screen;

/// Page buffer size. Must cover the byte budget of the page grid.
const PAGE_BUF: usize = 2048;

/// Fatal controller errors. Anything recoverable (a vanished file, an
/// out-of-range action) is absorbed and shown to the operator instead.
#[derive(Debug)]
pub enum ControlError<SE, PE> {
    /// The storage volume failed.
    Storage(SE),
    /// The presenter failed to draw.
    Present(PE),
    /// A book overflowed the page index.
    Index(IndexError),
}

impl<SE: core::fmt::Debug, PE: core::fmt::Debug> core::fmt::Display for ControlError<SE, PE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage failure: {e:?}"),
            Self::Present(e) => write!(f, "render failure: {e:?}"),
            Self::Index(e) => write!(f, "{e}"),
        }
    }
}

/// The reader's top-level state machine.
pub struct Controller<S: Storage, const N: usize, const B: usize> {
    storage: S,
    catalog: Catalog<N, B>,
    browse: Browse,
    screen: Screen,
    grid: PageGrid,
    /// Open session and the catalog position it belongs to.
    session: Option<(usize, ReaderSession<S::File, N>)>,
}

impl<S, const N: usize, const B: usize> Controller<S, N, B>
where
    S: Storage,
    S::File: File<Error = S::Error>,
{
    /// Scan the volume and draw the initial file list.
    ///
    /// `preindex_pages` bounds the eager indexing pass per file;
    /// hardware mains pass [`platform::config::PREINDEX_PAGES`].
    /// A storage failure here is fatal; a notice is drawn first so the
    /// operator sees more than a frozen panel.
    pub async fn start<P: Presenter>(
        mut storage: S,
        grid: PageGrid,
        preindex_pages: u32,
        presenter: &mut P,
    ) -> Result<Self, ControlError<S::Error, P::Error>> {
        presenter
            .notice("Scanning storage...")
            .await
            .map_err(ControlError::Present)?;

        let catalog = match Catalog::scan(&mut storage, &grid, preindex_pages).await {
            Ok(catalog) => catalog,
            Err(e) => {
                let _ = presenter.notice("Storage error - check card and reset").await;
                return Err(match e {
                    CatalogError::Storage(e) => ControlError::Storage(e),
                    CatalogError::Index(e) => ControlError::Index(e),
                });
            }
        };

        if catalog.is_empty() {
            presenter
                .notice("No text files found")
                .await
                .map_err(ControlError::Present)?;
        }

        let mut controller = Self {
            storage,
            browse: Browse::new(catalog.len()),
            catalog,
            screen: Screen::FileList,
            grid,
            session: None,
        };
        controller.render_list(presenter).await?;
        Ok(controller)
    }

    /// Screen currently shown.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Drive the reader until storage or the panel fails for good.
    pub async fn run<I, P>(
        &mut self,
        input: &mut I,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>>
    where
        I: InputDevice,
        P: Presenter,
    {
        loop {
            let action = input.wait_for_action().await;
            self.handle(action, presenter).await?;
        }
    }

    /// Handle one input action to completion.
    pub async fn handle<P: Presenter>(
        &mut self,
        action: ReaderAction,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>> {
        match self.screen {
            Screen::FileList => match action {
                ReaderAction::NavigateUp => {
                    if self.browse.move_up() {
                        self.render_list(presenter).await?;
                    }
                }
                ReaderAction::NavigateDown => {
                    if self.browse.move_down() {
                        self.render_list(presenter).await?;
                    }
                }
                ReaderAction::Activate => self.open_selected(presenter).await?,
                _ => {}
            },
            Screen::Reading => match action {
                ReaderAction::PageForward | ReaderAction::NavigateDown => {
                    self.turn(PageTurn::Forward, presenter).await?;
                }
                ReaderAction::PageBackward | ReaderAction::NavigateUp => {
                    self.turn(PageTurn::Backward, presenter).await?;
                }
                ReaderAction::Exit => self.close_book(presenter).await?,
                ReaderAction::Activate => {}
            },
        }
        Ok(())
    }

    async fn render_list<P: Presenter>(
        &mut self,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>> {
        let mut rows: heapless::Vec<ListRow<'_>, B> = heapless::Vec::new();
        for entry in self.catalog.iter() {
            let _ = rows.push(ListRow {
                name: entry.name.as_str(),
                has_resume: entry.index.resume_cursor() > 0,
            });
        }
        presenter
            .file_list(&rows, self.browse.selected())
            .await
            .map_err(ControlError::Present)
    }

    async fn open_selected<P: Presenter>(
        &mut self,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>> {
        // one session at a time: a predecessor is closed (position
        // saved) before the next book opens
        if let Some((prev, session)) = self.session.take() {
            if let Some(entry) = self.catalog.entry_mut(prev) {
                match session.close(&mut self.storage, entry).await {
                    Ok(()) | Err(SessionError::OpenFailed(_)) => {}
                    Err(SessionError::Storage(e)) => return Err(ControlError::Storage(e)),
                    Err(SessionError::Index(e)) => return Err(ControlError::Index(e)),
                }
            }
        }

        let at = self.browse.selected();
        let Some(entry) = self.catalog.entry_mut(at) else {
            return Ok(()); // empty catalog
        };

        // a changed file forces a full rebuild inside open; probe the
        // live size so that path also gets the indexing screen
        let stale = {
            let path = store::book_path(entry.name.as_str());
            match self.storage.open_file(path.as_str()).await {
                Ok(file) => file.size() != entry.size,
                // open will report the failure itself below
                Err(_) => false,
            }
        };
        if stale || !entry.index.complete() {
            presenter
                .indexing(entry.name.as_str())
                .await
                .map_err(ControlError::Present)?;
        }

        match ReaderSession::open(&mut self.storage, entry, &self.grid).await {
            Ok(session) => {
                self.session = Some((at, session));
                self.screen = Screen::Reading;
                self.render_page(presenter).await
            }
            Err(SessionError::OpenFailed(_)) => {
                // the file went away under us; stay on the list
                presenter
                    .notice("Could not open file")
                    .await
                    .map_err(ControlError::Present)?;
                self.render_list(presenter).await
            }
            Err(SessionError::Storage(e)) => Err(ControlError::Storage(e)),
            Err(SessionError::Index(e)) => Err(ControlError::Index(e)),
        }
    }

    async fn turn<P: Presenter>(
        &mut self,
        dir: PageTurn,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>> {
        let turned = match &mut self.session {
            Some((_, session)) => session.turn_page(dir),
            None => false,
        };
        if turned {
            self.render_page(presenter).await?;
        }
        Ok(())
    }

    async fn render_page<P: Presenter>(
        &mut self,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>> {
        let Some((_, session)) = &mut self.session else {
            return Ok(());
        };
        // SAFETY: one page of text, bounded by the grid's byte budget
        #[allow(clippy::large_stack_arrays)]
        let mut buf = [0u8; PAGE_BUF];
        let n = match session.read_page(&mut buf).await {
            Ok(n) => n,
            Err(SessionError::Storage(e) | SessionError::OpenFailed(e)) => {
                return Err(ControlError::Storage(e))
            }
            Err(SessionError::Index(e)) => return Err(ControlError::Index(e)),
        };
        let view = PageView {
            text: buf.get(..n).unwrap_or(&[]),
            current_page: session.current_page(),
            total_pages: session.total_pages(),
        };
        presenter.page(&view).await.map_err(ControlError::Present)
    }

    async fn close_book<P: Presenter>(
        &mut self,
        presenter: &mut P,
    ) -> Result<(), ControlError<S::Error, P::Error>> {
        if let Some((at, session)) = self.session.take() {
            if let Some(entry) = self.catalog.entry_mut(at) {
                match session.close(&mut self.storage, entry).await {
                    Ok(()) | Err(SessionError::OpenFailed(_)) => {}
                    Err(SessionError::Storage(e)) => return Err(ControlError::Storage(e)),
                    Err(SessionError::Index(e)) => return Err(ControlError::Index(e)),
                }
            }
        }
        self.screen = Screen::FileList;
        self.render_list(presenter).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use platform::storage_local::LocalFileStorage;
    use std::fs;
    use tempfile::TempDir;

    fn grid() -> PageGrid {
        PageGrid {
            chars_per_line: 4,
            lines_per_page: 2,
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    enum Event {
        List {
            names: Vec<String>,
            resume: Vec<bool>,
            selected: usize,
        },
        Page {
            text: Vec<u8>,
            current: u32,
            total: u32,
        },
        Indexing(String),
        Notice(String),
    }

    #[derive(Default)]
    struct Recording {
        events: Vec<Event>,
    }

    impl Presenter for Recording {
        type Error = core::convert::Infallible;

        async fn file_list(
            &mut self,
            rows: &[ListRow<'_>],
            selected: usize,
        ) -> Result<(), Self::Error> {
            self.events.push(Event::List {
                names: rows.iter().map(|r| r.name.to_string()).collect(),
                resume: rows.iter().map(|r| r.has_resume).collect(),
                selected,
            });
            Ok(())
        }

        async fn page(&mut self, view: &PageView<'_>) -> Result<(), Self::Error> {
            self.events.push(Event::Page {
                text: view.text.to_vec(),
                current: view.current_page,
                total: view.total_pages,
            });
            Ok(())
        }

        async fn indexing(&mut self, name: &str) -> Result<(), Self::Error> {
            self.events.push(Event::Indexing(name.to_string()));
            Ok(())
        }

        async fn notice(&mut self, msg: &str) -> Result<(), Self::Error> {
            self.events.push(Event::Notice(msg.to_string()));
            Ok(())
        }
    }

    type TestController = Controller<LocalFileStorage, 64, 8>;

    async fn boot(tmp: &TempDir, presenter: &mut Recording) -> TestController {
        let storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        Controller::start(storage, grid(), 100, presenter).await.unwrap()
    }

    #[tokio::test]
    async fn boot_draws_the_file_list() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"aaaa").unwrap();
        fs::write(tmp.path().join("b.txt"), b"bbbb").unwrap();
        let mut p = Recording::default();
        let ctrl = boot(&tmp, &mut p).await;

        assert_eq!(ctrl.screen(), Screen::FileList);
        let Event::List { names, selected, .. } = p.events.last().unwrap() else {
            panic!("expected a list event");
        };
        assert_eq!(names.len(), 2);
        assert_eq!(*selected, 0);
    }

    #[tokio::test]
    async fn empty_volume_notices_and_still_lists() {
        let tmp = TempDir::new().unwrap();
        let mut p = Recording::default();
        let _ctrl = boot(&tmp, &mut p).await;
        assert!(p
            .events
            .iter()
            .any(|e| *e == Event::Notice("No text files found".to_string())));
        assert!(matches!(p.events.last().unwrap(), Event::List { .. }));
    }

    #[tokio::test]
    async fn activate_opens_the_selected_book() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"AAAAAAAABB").unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;

        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();
        assert_eq!(ctrl.screen(), Screen::Reading);
        let Event::Page { text, current, total } = p.events.last().unwrap() else {
            panic!("expected a page event");
        };
        assert_eq!(text, b"AAAAAAAA");
        assert_eq!(*current, 0);
        assert_eq!(*total, 2);
    }

    #[tokio::test]
    async fn page_turns_redraw_and_clamp() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"AAAAAAAABBBBBB").unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;
        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();

        ctrl.handle(ReaderAction::PageForward, &mut p).await.unwrap();
        let Event::Page { text, current, .. } = p.events.last().unwrap() else {
            panic!("expected a page event");
        };
        assert_eq!(text, b"BBBBBB");
        assert_eq!(*current, 1);

        // already on the last page: no redraw
        let drawn = p.events.len();
        ctrl.handle(ReaderAction::PageForward, &mut p).await.unwrap();
        assert_eq!(p.events.len(), drawn);

        ctrl.handle(ReaderAction::PageBackward, &mut p).await.unwrap();
        let Event::Page { current, .. } = p.events.last().unwrap() else {
            panic!("expected a page event");
        };
        assert_eq!(*current, 0);
    }

    #[tokio::test]
    async fn exit_saves_the_position_and_marks_the_row() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"AAAAAAAABBBBBBBBCCCCCCCC").unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;
        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();
        ctrl.handle(ReaderAction::PageForward, &mut p).await.unwrap();
        ctrl.handle(ReaderAction::Exit, &mut p).await.unwrap();

        assert_eq!(ctrl.screen(), Screen::FileList);
        let Event::List { resume, .. } = p.events.last().unwrap() else {
            panic!("expected a list event");
        };
        assert_eq!(resume, &[true]);

        // reopening resumes at the saved page
        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();
        let Event::Page { current, .. } = p.events.last().unwrap() else {
            panic!("expected a page event");
        };
        assert_eq!(*current, 1);
    }

    #[tokio::test]
    async fn incomplete_index_shows_the_indexing_screen() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.txt"), [b'x'; 64]).unwrap();
        let mut p = Recording::default();
        let storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut ctrl: TestController =
            Controller::start(storage, grid(), 2, &mut p).await.unwrap();

        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();
        assert!(p
            .events
            .iter()
            .any(|e| *e == Event::Indexing("big.txt".to_string())));
        assert!(matches!(p.events.last().unwrap(), Event::Page { .. }));
    }

    #[tokio::test]
    async fn changed_file_shows_the_indexing_screen_before_the_rebuild() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), [b'x'; 16]).unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;

        // the file grows after the scan; opening must rebuild, and the
        // operator sees the indexing screen while it does
        fs::write(tmp.path().join("a.txt"), [b'x'; 64]).unwrap();
        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();

        assert!(p
            .events
            .iter()
            .any(|e| *e == Event::Indexing("a.txt".to_string())));
        let Event::Page { total, .. } = p.events.last().unwrap() else {
            panic!("expected a page event");
        };
        assert_eq!(*total, 9);
    }

    #[tokio::test]
    async fn vanished_file_notices_and_stays_on_the_list() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"aaaa").unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;
        fs::remove_file(tmp.path().join("a.txt")).unwrap();

        ctrl.handle(ReaderAction::Activate, &mut p).await.unwrap();
        assert_eq!(ctrl.screen(), Screen::FileList);
        assert!(p
            .events
            .iter()
            .any(|e| *e == Event::Notice("Could not open file".to_string())));
        assert!(matches!(p.events.last().unwrap(), Event::List { .. }));
    }

    struct Script {
        actions: std::collections::VecDeque<ReaderAction>,
    }

    impl InputDevice for Script {
        async fn wait_for_action(&mut self) -> ReaderAction {
            self.actions.pop_front().unwrap_or(ReaderAction::Exit)
        }

        fn poll_action(&mut self) -> Option<ReaderAction> {
            self.actions.pop_front()
        }
    }

    #[tokio::test]
    async fn scripted_session_reads_and_resumes() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"AAAAAAAABBBBBBBBCC").unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;

        let mut input = Script {
            actions: [
                ReaderAction::Activate,
                ReaderAction::PageForward,
                ReaderAction::PageForward,
                ReaderAction::Exit,
                ReaderAction::Activate,
            ]
            .into_iter()
            .collect(),
        };
        while let Some(action) = input.poll_action() {
            ctrl.handle(action, &mut p).await.unwrap();
        }

        // the reopened book is back on the page it was closed on
        assert_eq!(ctrl.screen(), Screen::Reading);
        let Event::Page { text, current, .. } = p.events.last().unwrap() else {
            panic!("expected a page event");
        };
        assert_eq!(text, b"CC");
        assert_eq!(*current, 2);
    }

    #[tokio::test]
    async fn list_navigation_redraws_only_on_movement() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"aaaa").unwrap();
        fs::write(tmp.path().join("b.txt"), b"bbbb").unwrap();
        let mut p = Recording::default();
        let mut ctrl = boot(&tmp, &mut p).await;

        let drawn = p.events.len();
        ctrl.handle(ReaderAction::NavigateUp, &mut p).await.unwrap();
        assert_eq!(p.events.len(), drawn); // clamped, no redraw

        ctrl.handle(ReaderAction::NavigateDown, &mut p).await.unwrap();
        let Event::List { selected, .. } = p.events.last().unwrap() else {
            panic!("expected a list event");
        };
        assert_eq!(*selected, 1);
    }
}
