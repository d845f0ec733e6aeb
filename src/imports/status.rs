use std::collections::BTreeMap;

use super::{DataImportBinding, ImportBindings, TargetImportBinding};
use crate::api::{DataBinding, ImportStatus, ImportType, TargetBinding, TargetImportStatus};

impl DataImportBinding {
    pub fn status(&self, name: &str) -> ImportStatus {
        let mut status = ImportStatus {
            name: name.to_owned(),
            import_type: ImportType::Data,
            data_ref: None,
            secret_ref: None,
            config_map_ref: None,
            target: None,
            target_list: Vec::new(),
            source_generation: self.object.generation(),
        };
        // binding was validated when the import was resolved
        match self.object.import.binding() {
            Ok(DataBinding::DataObject(data_ref)) => status.data_ref = Some(data_ref.to_owned()),
            Ok(DataBinding::Secret(reference)) => status.secret_ref = Some(reference.to_string()),
            Ok(DataBinding::ConfigMap(reference)) => {
                status.config_map_ref = Some(reference.to_string())
            }
            Err(_) => {}
        }
        status
    }
}

impl TargetImportBinding {
    pub fn status(&self, name: &str) -> ImportStatus {
        let single = self
            .targets
            .first()
            .and_then(|t| t.import.binding().ok())
            .and_then(|binding| match binding {
                TargetBinding::Single(target) => Some(target.to_owned()),
                _ => None,
            });
        let mut target_list: Vec<_> = self
            .targets
            .iter()
            .map(|t| TargetImportStatus {
                target: t.name().to_owned(),
                source_generation: t.generation(),
            })
            .collect();
        target_list.sort_by(|a, b| a.target.cmp(&b.target));
        match single {
            Some(target) => ImportStatus {
                name: name.to_owned(),
                import_type: ImportType::Target,
                data_ref: None,
                secret_ref: None,
                config_map_ref: None,
                target: Some(target),
                source_generation: target_list.first().map_or(0, |t| t.source_generation),
                target_list: Vec::new(),
            },
            None => ImportStatus {
                name: name.to_owned(),
                import_type: ImportType::TargetList,
                data_ref: None,
                secret_ref: None,
                config_map_ref: None,
                target: None,
                target_list,
                source_generation: 0,
            },
        }
    }
}

impl ImportBindings {
    /// Status records of every successfully bound import
    pub fn import_status(&self) -> Vec<ImportStatus> {
        let data = self
            .data
            .iter()
            .filter_map(|(name, r)| r.as_ref().ok().map(|b| b.status(name)));
        let targets = self
            .targets
            .iter()
            .filter_map(|(name, r)| r.as_ref().ok().map(|b| b.status(name)));
        data.chain(targets).collect()
    }

    /// Names of bound imports whose source changed since `previous` was recorded.
    ///
    /// Imports without a previous record count as changed.
    pub fn outdated(&self, previous: &[ImportStatus]) -> Vec<String> {
        let previous: BTreeMap<&str, &ImportStatus> =
            previous.iter().map(|s| (s.name.as_str(), s)).collect();
        self.import_status()
            .into_iter()
            .filter(|current| previous.get(current.name.as_str()).copied() != Some(current))
            .map(|current| current.name)
            .collect()
    }
}
