//! Upload orchestration
//!
//! A [`Session`] owns the single-flight run flag and the run log. Each run
//! walks a fixed sequence: Arduino path, preferences, project config,
//! target, data directory, image path, memory config, flash parameters,
//! tools, transport, then pack and upload. The first failing step ends the
//! run. The run flag is released by [`RunGuard`] on every exit path.

use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::command::{ota_upload_command, pack_command, serial_upload_command, CommandLine};
use super::memory::{
    resolve_flash_parameters, resolve_memory_config, FlashParameters, SpiffsLayout, RESET_METHOD,
    UPLOAD_SPEED,
};
use super::project::ProjectConfig;
use super::properties::Properties;
use super::report::LogSink;
use super::settings::Settings;
use super::target::{resolve_target, Target};
use super::tools::{board_package, boards_file, locate_tool, tools_path, Tool};
use super::transport::{resolve_transport, Transport};
use crate::config::defaults::PACKER_TOOL;
use crate::config::files::{DATA_DIR, IMAGE_FILE, PREFERENCES_FILE};
use crate::error::{Result, UploadError};
use crate::infra::dirs::default_preferences_dir;
use crate::infra::filesystem::{dir_stats, read_file, require_dir, DirStats};
use crate::infra::platform::HostPlatform;
use crate::infra::{process, toolchain};

/// How far a run goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Pack the image and upload it
    #[default]
    Upload,
    /// Pack the image only
    Pack,
    /// Resolve everything, run nothing
    Plan,
}

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub project_root: PathBuf,
    pub settings: Settings,
    pub platform: HostPlatform,
    pub mode: RunMode,
}

/// Everything a run resolved before touching the device
#[derive(Debug, Clone, Serialize)]
pub struct UploadPlan {
    pub arduino_path: PathBuf,
    pub preferences_dir: PathBuf,
    pub target: Target,
    pub board_package_version: String,
    pub data_dir: PathBuf,
    pub data_files: u64,
    pub data_bytes: u64,
    pub image: PathBuf,
    pub memory_config: String,
    pub flash_parameters: FlashParameters,
    pub layout: SpiffsLayout,
    pub tools_dir: PathBuf,
    pub packer: Tool,
    pub transport: Option<Transport>,
    pub uploader: Option<Tool>,
    #[serde(serialize_with = "as_display")]
    pub pack_command: CommandLine,
    #[serde(serialize_with = "as_display_opt")]
    pub upload_command: Option<CommandLine>,
}

fn as_display<S: Serializer>(cmd: &CommandLine, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(cmd)
}

fn as_display_opt<S: Serializer>(
    cmd: &Option<CommandLine>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match cmd {
        Some(cmd) => serializer.collect_str(cmd),
        None => serializer.serialize_none(),
    }
}

/// Holds the run flag for the duration of a run
#[derive(Debug)]
pub struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Single-flight upload context
pub struct Session {
    running: AtomicBool,
    sink: Arc<dyn LogSink>,
}

impl Session {
    /// Create an idle session logging to `sink`
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            running: AtomicBool::new(false),
            sink,
        }
    }

    /// Whether a run currently holds the flag
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Take the run flag, or fail if another run holds it
    pub fn try_begin(&self) -> Result<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| UploadError::AlreadyRunning)?;
        Ok(RunGuard {
            running: &self.running,
        })
    }

    /// Run the full sequence for `request`
    pub fn run(&self, request: &RunRequest) -> Result<UploadPlan> {
        let _guard = self.try_begin()?;

        self.sink.announce("ESP8266 Upload File System started.");
        let result = Pipeline {
            request,
            sink: self.sink.as_ref(),
        }
        .run();
        if let Err(e) = &result {
            self.sink.urgent(&e.to_string());
        }
        self.sink.announce("ESP8266 Upload File System finished.");

        result
    }
}

/// Relative paths from configuration are taken from the project root
fn resolve_against(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

struct Pipeline<'a> {
    request: &'a RunRequest,
    sink: &'a dyn LogSink,
}

impl Pipeline<'_> {
    fn settings(&self) -> &Settings {
        &self.request.settings
    }

    fn root(&self) -> &Path {
        &self.request.project_root
    }

    fn run(&self) -> Result<UploadPlan> {
        let plan = self.resolve()?;

        if self.request.mode == RunMode::Plan {
            return Ok(plan);
        }

        self.sink.stage("--- Packing SPIFFS file ---");
        self.pack(&plan)?;

        if let Some(upload) = &plan.upload_command {
            self.sink.stage("--- Uploading SPIFFS file ---");
            self.upload(&plan, upload)?;
        }

        Ok(plan)
    }

    fn resolve(&self) -> Result<UploadPlan> {
        let platform = &self.request.platform;

        let arduino_path =
            toolchain::resolve_install_path(self.settings().paths.arduino.as_deref(), platform)?;
        self.sink
            .verbose(&format!("Arduino path: \"{}\"", arduino_path.display()));

        let preferences_dir = self.preferences_dir()?;
        let preferences = self.preferences(&preferences_dir)?;
        let project = ProjectConfig::load(self.root())?;

        let target = resolve_target(&project, &preferences)?;
        self.sink.debug(&format!("target: {target}"));

        let data_dir = self.data_dir(&project)?;
        let image = self.image_path(&project)?;

        let memory_config = resolve_memory_config(&project, &preferences, &target)?;
        self.sink.verbose(&format!("Memory Config: {memory_config}"));

        let package = board_package(&preferences_dir, &target)?;
        self.sink
            .important(&format!("Found ESP8266 version {}", package.version));
        let boards = read_file(&boards_file(&package)?)?;
        let flash_parameters = resolve_flash_parameters(&boards, &target, &memory_config, &project)?;
        for (key, value) in flash_parameters.iter() {
            self.sink.debug(&format!("  \"{key}\": \"{value}\""));
        }
        let layout = SpiffsLayout::from_parameters(&flash_parameters)?;

        let tools_dir = tools_path(&preferences_dir, &target)?;
        self.sink
            .verbose(&format!("Tools Path: \"{}\"", tools_dir.display()));
        let packer = self.tool(&tools_dir, PACKER_TOOL)?;

        let (transport, uploader) = if self.request.mode == RunMode::Pack {
            (None, None)
        } else {
            let transport = resolve_transport(&project, &preferences)?;
            self.sink.verbose(&format!("Output Port: {}", transport.port()));
            let uploader = self.tool(&tools_dir, transport.tool_name())?;
            (Some(transport), Some(uploader))
        };

        let stats = dir_stats(&data_dir);
        self.check_capacity(stats, &layout);

        let pack_command = pack_command(&packer.program, &data_dir, &layout, &image);
        let upload_command = match (&transport, &uploader) {
            (Some(transport), Some(uploader)) => {
                Some(self.upload_command(transport, uploader, &flash_parameters, &layout, &image)?)
            }
            _ => None,
        };

        Ok(UploadPlan {
            arduino_path,
            preferences_dir,
            target,
            board_package_version: package.version,
            data_dir,
            data_files: stats.files,
            data_bytes: stats.bytes,
            image,
            memory_config,
            flash_parameters,
            layout,
            tools_dir,
            packer,
            transport,
            uploader,
            pack_command,
            upload_command,
        })
    }

    fn preferences_dir(&self) -> Result<PathBuf> {
        let dir = self
            .settings()
            .paths
            .preferences
            .clone()
            .or_else(|| default_preferences_dir(&self.request.platform))
            .ok_or_else(|| UploadError::NotConfigured {
                what: "preferences path".to_string(),
                hint: "set the Arduino preferences directory".to_string(),
            })?;

        require_dir("Preferences path", &dir)?;
        self.sink
            .verbose(&format!("Preferences Path: \"{}\"", dir.display()));
        Ok(dir)
    }

    fn preferences(&self, preferences_dir: &Path) -> Result<Properties> {
        let file = preferences_dir.join(PREFERENCES_FILE);
        self.sink
            .verbose(&format!("Reading preferences from \"{}\"", file.display()));
        let preferences = Properties::load(&file)?;
        for (key, value) in preferences.iter() {
            self.sink.debug(&format!("  \"{key}\"=\"{value}\""));
        }
        Ok(preferences)
    }

    fn data_dir(&self, project: &ProjectConfig) -> Result<PathBuf> {
        let dir = project
            .data_files
            .as_deref()
            .map(PathBuf::from)
            .or_else(|| self.settings().paths.data_files.clone())
            .map_or_else(|| self.root().join(DATA_DIR), |p| resolve_against(self.root(), p));

        require_dir("ESP8266 Data Files path", &dir)?;
        self.sink
            .verbose(&format!("ESP8266 Data Files path: \"{}\"", dir.display()));
        Ok(dir)
    }

    fn image_path(&self, project: &ProjectConfig) -> Result<PathBuf> {
        let temp = project
            .temp
            .as_deref()
            .map(PathBuf::from)
            .or_else(|| self.settings().paths.temp.clone())
            .map_or_else(std::env::temp_dir, |p| resolve_against(self.root(), p));

        require_dir("ESP8266 Temp Files location", &temp)?;
        let image = temp.join(IMAGE_FILE);
        self.sink
            .verbose(&format!("SPIFFS File: \"{}\"", image.display()));
        Ok(image)
    }

    fn tool(&self, tools_dir: &Path, name: &str) -> Result<Tool> {
        let tool = locate_tool(tools_dir, name, &self.request.platform)?;
        self.sink
            .verbose(&format!("{name}: {}", tool.program.display()));
        self.sink
            .important(&format!("Found {name} version {}", tool.version));
        Ok(tool)
    }

    fn check_capacity(&self, stats: DirStats, layout: &SpiffsLayout) {
        if stats.bytes > layout.size() {
            let message = format!(
                "Data files ({} bytes in {} files) exceed the SPIFFS region ({} bytes)",
                stats.bytes,
                stats.files,
                layout.size()
            );
            tracing::warn!("{message}");
            self.sink.important(&message);
        }
    }

    fn upload_command(
        &self,
        transport: &Transport,
        uploader: &Tool,
        params: &FlashParameters,
        layout: &SpiffsLayout,
        image: &Path,
    ) -> Result<CommandLine> {
        match transport {
            Transport::Serial(port) => {
                serial_upload_command(&uploader.program, params, layout, port, image)
            }
            Transport::Network(ip) => {
                let python = self.request.platform.program_name(self.settings().python());
                Ok(ota_upload_command(
                    Path::new(&python),
                    &uploader.program,
                    ip,
                    image,
                ))
            }
        }
    }

    fn pack(&self, plan: &UploadPlan) -> Result<()> {
        self.sink
            .important(&format!("SPIFFS Creating Image... ({})", plan.image.display()));
        self.sink
            .detail(&format!("  [SPIFFS] program: {}", plan.packer.program.display()));
        self.sink
            .detail(&format!("  [SPIFFS] data   : {}", plan.data_dir.display()));
        self.sink
            .detail(&format!("  [SPIFFS] size   : {}K", plan.layout.size() >> 10));
        self.sink
            .detail(&format!("  [SPIFFS] page   : {}", plan.layout.page_size));
        self.sink
            .detail(&format!("  [SPIFFS] block  : {}", plan.layout.block_size));

        process::run(&plan.pack_command, self.sink)
    }

    fn upload(&self, plan: &UploadPlan, command: &CommandLine) -> Result<()> {
        self.sink
            .important(&format!("SPIFFS Uploading Image... ({})", plan.image.display()));

        match (&plan.transport, &plan.uploader) {
            (Some(Transport::Network(ip)), Some(espota)) => {
                self.sink
                    .detail(&format!("  [SPIFFS] Python: {}", command.program.display()));
                self.sink
                    .detail(&format!("  [SPIFFS] EspOTA: {}", espota.program.display()));
                self.sink.detail(&format!("  [SPIFFS] IP    : {ip}"));
            }
            (Some(Transport::Serial(port)), Some(esptool)) => {
                let params = &plan.flash_parameters;
                let field = |key| params.get(key).unwrap_or_default();
                self.sink
                    .detail(&format!("  [SPIFFS] program: {}", esptool.program.display()));
                self.sink
                    .detail(&format!("  [SPIFFS] address: 0x{:06X}", plan.layout.start));
                self.sink
                    .detail(&format!("  [SPIFFS] reset  : {}", field(RESET_METHOD)));
                self.sink.detail(&format!("  [SPIFFS] port   : {port}"));
                self.sink
                    .detail(&format!("  [SPIFFS] speed  : {}", field(UPLOAD_SPEED)));
            }
            _ => {}
        }

        process::run(command, self.sink)
    }
}
