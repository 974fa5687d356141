use anyhow::Result;
use chrono::Utc;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::gps_processor::{self, ProcessResult};
use crate::main_db::{DbLocation, MainDb, Setting};
use crate::route::RoutePoint;

/// The append/read contract the recorder needs from persistence.
pub trait RoutePointStore {
    fn append(&self, route_point: &RoutePoint) -> Result<()>;

    /// Every stored point, sorted by timestamp.
    fn read_all(&self) -> Result<Vec<RoutePoint>>;

    /// Called for every valid fix after the admission filter ran. Only
    /// accepted ones are appended.
    fn record_gps_data(
        &self,
        raw_data: &gps_processor::RawData,
        process_result: ProcessResult,
    ) -> Result<()> {
        match process_result {
            ProcessResult::Reject => Ok(()),
            ProcessResult::Accept => self.append(&raw_data.to_route_point()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    OnDisk { support_dir: String },
    InMemory,
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnDisk { support_dir } => write!(f, "on-disk({support_dir})"),
            Self::InMemory => write!(f, "in-memory"),
        }
    }
}

impl StorageConfig {
    fn db_location(&self) -> DbLocation {
        match self {
            Self::OnDisk { support_dir } => DbLocation::Dir(support_dir.clone()),
            Self::InMemory => DbLocation::InMemory,
        }
    }

    fn support_dir(&self) -> Option<&str> {
        match self {
            Self::OnDisk { support_dir } => Some(support_dir),
            Self::InMemory => None,
        }
    }
}

pub struct RawDataFile {
    pub name: String,
    pub path: String,
}

/* This is an optional feature that should be off by default: storing every
   valid fix together with the admission decision. It is designed for debugging
   the filter thresholds. It stores data in a simple csv format and will be
   using a new file every time the app starts.
*/
struct RawDataRecorder {
    dir: PathBuf,
    file: Option<File>,
}

impl RawDataRecorder {
    fn init(support_dir: &str) -> Result<RawDataRecorder> {
        let dir = Path::new(support_dir).join("raw_data/");
        std::fs::create_dir_all(&dir)?;
        Ok(RawDataRecorder { dir, file: None })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush()?;
        }
        Ok(())
    }

    fn open_new_file(&self) -> Result<File> {
        let timestamp_sec = Utc::now().timestamp();
        let mut i = 0;
        let filename = loop {
            let filename = self.dir.join(format!("gps-{timestamp_sec}-{i}.csv"));
            if std::fs::metadata(&filename).is_err() {
                break filename;
            }
            i += 1;
        };
        let mut file = File::create(filename)?;
        file.write_all(
            "timestamp_ms,latitude,longitude,accuracy,altitude,speed,process_result\n".as_bytes(),
        )?;
        Ok(file)
    }

    fn record(
        &mut self,
        raw_data: &gps_processor::RawData,
        process_result: ProcessResult,
    ) -> Result<()> {
        if self.file.is_none() {
            self.file = Some(self.open_new_file()?);
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Ok(()),
        };
        let optional = |x: Option<String>| x.unwrap_or_default();
        file.write_all(
            format!(
                "{},{},{},{},{},{},{}\n",
                optional(raw_data.timestamp_ms.map(|x| x.to_string())),
                raw_data.point.latitude,
                raw_data.point.longitude,
                optional(raw_data.accuracy.map(|x| x.to_string())),
                optional(raw_data.altitude.map(|x| x.to_string())),
                optional(raw_data.speed.map(|x| x.to_string())),
                process_result.to_int()
            )
            .as_bytes(),
        )?;
        Ok(())
    }
}

pub struct Storage {
    config: StorageConfig,
    pub main_db: Mutex<MainDb>,
    raw_data_recorder: Mutex<Option<RawDataRecorder>>, // `None` means disabled
}

impl Storage {
    /// Tries each config in order and keeps the first one that opens. Only
    /// fails if none of them does.
    pub fn init(configs: &[StorageConfig]) -> Result<Self> {
        let mut errors = Vec::new();
        for config in configs {
            match Self::init_with(config.clone()) {
                Ok(storage) => {
                    info!("[storage] using {}", config);
                    return Ok(storage);
                }
                Err(error) => {
                    warn!("[storage] {} unavailable, trying next option: {}", config, error);
                    errors.push(format!("{config}: {error}"));
                }
            }
        }
        bail!(
            "[storage] no usable storage config. errors: [{}]",
            errors.join("; ")
        )
    }

    /// On-disk storage under `support_dir`, falling back to memory.
    pub fn init_default(support_dir: String) -> Result<Self> {
        Self::init(&[
            StorageConfig::OnDisk { support_dir },
            StorageConfig::InMemory,
        ])
    }

    fn init_with(config: StorageConfig) -> Result<Self> {
        let mut main_db = MainDb::open_at(&config.db_location())?;
        let raw_data_recorder = match config.support_dir() {
            Some(support_dir)
                if main_db.get_setting_with_default(Setting::RawDataMode, false) =>
            {
                Some(RawDataRecorder::init(support_dir)?)
            }
            _ => None,
        };
        Ok(Storage {
            config,
            main_db: Mutex::new(main_db),
            raw_data_recorder: Mutex::new(raw_data_recorder),
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn toggle_raw_data_mode(&self, enable: bool) -> Result<()> {
        let support_dir = match self.config.support_dir() {
            Some(support_dir) => support_dir,
            None => bail!("[storage] raw data mode needs on-disk storage"),
        };
        let mut raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        if enable {
            if raw_data_recorder.is_none() {
                *raw_data_recorder = Some(RawDataRecorder::init(support_dir)?);
                debug!("[storage] raw data mod enabled");
                let mut main_db = self.main_db.lock().unwrap();
                main_db.set_setting(Setting::RawDataMode, true)?;
            }
        } else if raw_data_recorder.is_some() {
            debug!("[storage] raw data mod disabled");
            // `drop` should do the right thing and release all resources.
            *raw_data_recorder = None;
            let mut main_db = self.main_db.lock().unwrap();
            main_db.set_setting(Setting::RawDataMode, false)?;
        }
        Ok(())
    }

    pub fn get_raw_data_mode(&self) -> bool {
        let raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        raw_data_recorder.is_some()
    }

    pub fn list_all_raw_data(&self) -> Result<Vec<RawDataFile>> {
        let mut result = Vec::new();
        let dir = match self.config.support_dir() {
            Some(support_dir) => Path::new(support_dir).join("raw_data/"),
            None => return Ok(result),
        };
        if !dir.exists() {
            return Ok(result);
        }
        for entry in std::fs::read_dir(dir)? {
            let file = entry?;
            let filename = file.file_name().to_string_lossy().into_owned();
            if filename.ends_with(".csv") {
                result.push(RawDataFile {
                    name: filename,
                    path: file.path().to_string_lossy().into_owned(),
                })
            }
        }
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    pub fn import_route_points(&self, route_points: &[RoutePoint]) -> Result<()> {
        let mut main_db = self.main_db.lock().unwrap();
        main_db.with_txn(|txn| txn.append_route_points(route_points))
    }

    pub fn flush(&self) -> Result<()> {
        debug!("[storage] flushing");

        let main_db = self.main_db.lock().unwrap();
        main_db.flush()?;
        drop(main_db);

        let mut raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        if let Some(ref mut x) = *raw_data_recorder {
            x.flush()?;
        }
        drop(raw_data_recorder);

        Ok(())
    }
}

impl RoutePointStore for Storage {
    fn append(&self, route_point: &RoutePoint) -> Result<()> {
        let mut main_db = self.main_db.lock().unwrap();
        main_db.append_route_point(route_point)
    }

    fn read_all(&self) -> Result<Vec<RoutePoint>> {
        let mut main_db = self.main_db.lock().unwrap();
        main_db.with_txn(|txn| txn.read_all_route_points())
    }

    fn record_gps_data(
        &self,
        raw_data: &gps_processor::RawData,
        process_result: ProcessResult,
    ) -> Result<()> {
        let mut raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        if let Some(ref mut x) = *raw_data_recorder {
            // best effort
            if let Err(error) = x.record(raw_data, process_result) {
                warn!("[storage] failed to record raw data: {}", error);
            }
        }
        drop(raw_data_recorder);

        match process_result {
            ProcessResult::Reject => Ok(()),
            ProcessResult::Accept => self.append(&raw_data.to_route_point()),
        }
    }
}
