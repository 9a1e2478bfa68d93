//! Application main loop

use anyhow::Result;
use app_core::{AppState, Command, CommandId, DashboardState, DetailState, Route};
use app_ui::{
    components::{
        DashboardAction, DashboardView, DetailView, Dialog, DialogResult, PageScanRenderer,
        RecoveryPanel, Sidebar, StatusBar, StatusInfo, UploadDialog, UploadRequest,
    },
    InputHandler, Renderer, Theme,
};
use crossbeam_channel::{Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Name of the created file, or the message to show in the dialog
type UploadResult = std::result::Result<String, String>;

const SIDEBAR_WIDTH: f32 = 200.0;

/// Main application state for the event loop
struct App {
    state: Arc<AppState>,
    runtime: Runtime,

    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    input_handler: Option<InputHandler>,
    theme: Theme,

    // Views
    route: Route,
    dashboard: DashboardState,
    dashboard_view: DashboardView,
    detail: DetailState,
    detail_view: DetailView,
    upload_dialog: UploadDialog,

    // Background work
    fetch_task: Option<JoinHandle<()>>,
    upload_tx: Sender<UploadResult>,
    upload_rx: Receiver<UploadResult>,

    status: StatusInfo,
    /// Panic caught while drawing the views; shows the recovery panel
    fault: Option<String>,
}

impl App {
    fn new(state: Arc<AppState>, runtime: Runtime) -> Self {
        let config = state.config.read().clone();
        let (upload_tx, upload_rx) = crossbeam_channel::unbounded();

        let dashboard = DashboardState::mount(state.prefs.clone(), &config.dashboard);
        let mut dashboard_view = DashboardView::new();
        dashboard_view.reset(&dashboard);

        let status = StatusInfo {
            source: config.api.base_url.clone(),
            ..Default::default()
        };

        let detail_view = DetailView::new(Arc::new(PageScanRenderer), runtime.handle().clone());

        Self {
            detail: DetailState::mount(state.prefs.clone()),
            detail_view,
            state,
            runtime,

            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            egui_renderer: None,
            input_handler: None,
            theme: Theme::by_name(&config.general.theme),

            route: Route::Dashboard,
            dashboard,
            dashboard_view,
            upload_dialog: UploadDialog::new(),

            fetch_task: None,
            upload_tx,
            upload_rx,

            status,
            fault: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(window_title(self.route))
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800))
            .with_min_inner_size(winit::dpi::LogicalSize::new(800, 500));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(&renderer.device, renderer.config.format, None, 1, false);

        let keybindings = self.state.config.read().keybindings.clone();
        self.input_handler = Some(InputHandler::new(keybindings));

        self.theme.apply(&self.egui_ctx);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        // First mount
        self.on_mount();
        Ok(())
    }

    /// Switch views, re-reading persisted preferences for the new one
    fn navigate(&mut self, route: Route) {
        tracing::info!(path = route.path(), "Navigating");
        let config = self.state.config.read().clone();

        match route {
            Route::Dashboard => {
                self.dashboard = DashboardState::mount(self.state.prefs.clone(), &config.dashboard);
                self.dashboard_view.reset(&self.dashboard);
            }
            Route::Details => {
                self.detail = DetailState::mount(self.state.prefs.clone());
                self.detail_view.clear_previews();
            }
        }
        self.route = route;

        if let Some(window) = &self.window {
            window.set_title(&window_title(route));
        }
        self.on_mount();
    }

    fn on_mount(&mut self) {
        if self.state.files.should_fetch_on_mount() {
            self.spawn_fetch();
        }
    }

    /// Start a list fetch unless one started here is still running
    fn spawn_fetch(&mut self) {
        if self.fetch_task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let state = self.state.clone();
        self.fetch_task = Some(self.runtime.spawn(async move {
            if let Err(e) = state.refresh_files().await {
                tracing::warn!("Files fetch failed: {}", e);
            }
        }));
    }

    fn start_upload(&mut self, request: UploadRequest) {
        let state = self.state.clone();
        let tx = self.upload_tx.clone();
        self.status.message = format!("Uploading {}...", request.candidate.name);

        self.runtime.spawn(async move {
            let result = state
                .upload(&request.candidate, &request.uploaded_by)
                .await
                .map(|record| record.file_name)
                .map_err(|e| {
                    if e.is_recoverable() {
                        tracing::warn!("Upload failed: {}", e);
                    } else {
                        tracing::error!("Upload failed: {}", e);
                    }
                    e.user_message()
                });
            if tx.send(result).is_err() {
                tracing::debug!("Upload finished after the window closed");
            }
        });
    }

    /// Apply finished background work to the views
    fn poll_background(&mut self) {
        while let Ok(result) = self.upload_rx.try_recv() {
            match result {
                Ok(name) => {
                    self.status.message = format!("Added {}", name);
                    self.upload_dialog.finish(Ok(()));
                }
                Err(message) => {
                    self.status.message.clear();
                    self.upload_dialog.finish(Err(message));
                }
            }
        }

        if self.state.files.is_invalidated() {
            self.spawn_fetch();
        }
    }

    fn on_focus(&mut self) {
        let files = &self.state.files;
        if files.options().refetch_on_focus && files.is_stale() {
            tracing::debug!("Window focused with stale files, refetching");
            self.spawn_fetch();
        }
    }

    fn render(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(renderer) = &self.renderer else {
            return;
        };
        let Some(frame) = renderer.acquire_frame() else {
            return;
        };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let raw_input = egui_state.take_egui_input(&window);

        self.poll_background();

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| self.ui(ctx));

        if let Some(egui_state) = &mut self.egui_state {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let (Some(renderer), Some(egui_renderer)) = (&self.renderer, &mut self.egui_renderer) else {
            return;
        };

        let screen_descriptor = renderer.screen_descriptor(full_output.pixels_per_point);

        let mut encoder = renderer
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("egui encoder") });

        for (id, delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&renderer.device, &renderer.queue, *id, delta);
        }

        egui_renderer.update_buffers(
            &renderer.device,
            &renderer.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        let [r, g, b, a] = self.theme.clear_color();
        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                // egui-wgpu 0.29 wants a 'static pass; the pass is dropped before finish()
                .forget_lifetime();

            egui_renderer.render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        renderer.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    fn ui(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.fault.clone() {
            if RecoveryPanel::ui(ctx, &self.theme, &message) {
                self.fault = None;
                self.navigate(Route::Dashboard);
            }
            return;
        }

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.views(ctx))) {
            let message = app_log::panic_message(payload.as_ref()).to_string();
            tracing::error!(route = self.route.path(), "View failed: {}", message);
            self.fault = Some(message);
        }
    }

    fn views(&mut self, ctx: &egui::Context) {
        let files = self.state.files.snapshot();

        // Dropping a file anywhere opens the upload dialog with it
        if !self.upload_dialog.is_open() && ctx.input(|i| !i.raw.dropped_files.is_empty()) {
            self.upload_dialog.open();
        }

        let mut picked_route = None;
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(SIDEBAR_WIDTH)
            .frame(egui::Frame::none().fill(self.theme.surface).inner_margin(12.0))
            .show(ctx, |ui| {
                picked_route = Sidebar::ui(ui, &self.theme, self.route);
            });

        self.status.records = files.records.as_ref().map(|records| records.len());
        self.status.fetching = files.is_fetching;
        self.status.uploading = self.state.is_uploading();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            StatusBar::ui(ui, &self.status);
        });

        let mut dashboard_action = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.background).inner_margin(24.0))
            .show(ctx, |ui| match self.route {
                Route::Dashboard => {
                    dashboard_action = self.dashboard_view.ui(ui, &self.theme, &mut self.dashboard, &files);
                }
                Route::Details => {
                    self.detail_view.ui(ui, &self.theme, &mut self.detail, &files);
                }
            });

        match self.upload_dialog.ui(ctx, &self.theme) {
            DialogResult::Ok(request) => self.start_upload(request),
            DialogResult::Cancel => {
                tracing::debug!("Upload dialog cancelled");
                self.status.message.clear();
            }
            DialogResult::None => {}
        }

        match dashboard_action {
            Some(DashboardAction::OpenFile(id)) => {
                let route = self.dashboard.open_file(&id);
                self.navigate(route);
            }
            Some(DashboardAction::AddDocument) => self.upload_dialog.open(),
            None => {}
        }

        if let Some(route) = picked_route {
            self.navigate(route);
        }
    }

    /// Execute a command; false if it does not apply to the current view
    fn execute_command(&mut self, cmd: &Command) -> bool {
        tracing::debug!(command = cmd.id.as_str(), route = self.route.path(), "Executing command");

        let files = self.state.files.snapshot();
        let records = files.records();

        match (cmd.id.as_str(), self.route) {
            (CommandId::NAV_NEXT_ITEM, Route::Details) => self.detail.next(records),
            (CommandId::NAV_PREV_ITEM, Route::Details) => self.detail.previous(records),

            (CommandId::VIEW_NEXT_PAGE, Route::Details) => {
                self.detail.nav_mut().next_preview_page();
            }
            (CommandId::VIEW_PREV_PAGE, Route::Details) => {
                self.detail.nav_mut().prev_preview_page();
            }
            (CommandId::VIEW_NEXT_PAGE, Route::Dashboard) => {
                let total_pages = self.dashboard.run(records).total_pages;
                self.dashboard.next_page(total_pages);
            }
            (CommandId::VIEW_PREV_PAGE, Route::Dashboard) => self.dashboard.prev_page(),

            (CommandId::APP_UPLOAD, _) => self.upload_dialog.open(),
            (CommandId::APP_SEARCH, route) => {
                if route != Route::Dashboard {
                    self.navigate(Route::Dashboard);
                }
                self.dashboard_view.focus_search();
            }
            (CommandId::APP_DASHBOARD, route) | (CommandId::APP_DETAILS, route) => {
                let target = if cmd.is(CommandId::APP_DASHBOARD) {
                    Route::Dashboard
                } else {
                    Route::Details
                };
                if route != target {
                    self.navigate(target);
                }
            }

            _ => return false,
        }
        true
    }
}

fn window_title(route: Route) -> String {
    format!("FileDesk - {}", route.title())
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.consumed {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
            }

            WindowEvent::Focused(true) => self.on_focus(),

            WindowEvent::KeyboardInput { event, .. } => {
                let cmd = self.input_handler.as_ref().and_then(|h| h.handle_key(&event));
                if let Some(cmd) = cmd {
                    if cmd.is(CommandId::APP_EXIT) {
                        event_loop.exit();
                        return;
                    }
                    self.execute_command(&cmd);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let cmd = self
                    .input_handler
                    .as_ref()
                    .and_then(|h| h.handle_mouse_button(button, state));
                if let Some(cmd) = cmd {
                    self.execute_command(&cmd);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                if let Some(handler) = &mut self.input_handler {
                    handler.update_modifiers(modifiers.state());
                }
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Run the application
pub fn run(state: Arc<AppState>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("filedesk-worker")
        .build()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(state, runtime);
    event_loop.run_app(&mut app)?;

    tracing::info!("FileDesk exiting");
    Ok(())
}
