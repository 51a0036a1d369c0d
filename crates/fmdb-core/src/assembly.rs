// ── Query result assembly ──
//
// Stored devices carry only their type's ID. Listings fetch every device
// type once, index them by ID, and substitute the full type into each
// device. What happens to a device whose type is gone is up to
// `MissingTypePolicy`.

use std::collections::HashMap;

use tracing::warn;

use crate::config::MissingTypePolicy;
use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{Device, DeviceType, EntityKind};
use crate::query::QueryResult;

/// Replace each device's type reference with the full DeviceType.
pub fn resolve_types(
    devices: Vec<Device>,
    types: &[DeviceType],
    policy: MissingTypePolicy,
) -> Result<Vec<Device>, CoreError> {
    let by_id: HashMap<&str, &DeviceType> = types.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut resolved = Vec::with_capacity(devices.len());
    for mut device in devices {
        match by_id.get(device.device_type.id.as_str()) {
            Some(found) => {
                device.device_type = (*found).clone();
                resolved.push(device);
            }
            None => match policy {
                MissingTypePolicy::Omit => {
                    warn!(
                        device = %device.id,
                        device_type = %device.device_type.id,
                        "omitting device whose type does not exist"
                    );
                }
                MissingTypePolicy::Fail => {
                    return Err(CoreError::NotFound {
                        entity: EntityKind::DeviceType,
                        id: device.device_type.id,
                    });
                }
            },
        }
    }
    Ok(resolved)
}

impl Facility {
    /// Resolve the types of one page of devices with a single bulk fetch.
    pub(crate) async fn assemble(
        &self,
        devices: QueryResult<Device>,
    ) -> Result<QueryResult<Device>, CoreError> {
        if devices.docs.is_empty() {
            return Ok(devices);
        }
        let types = self.all_of::<DeviceType>().await?;
        Ok(QueryResult {
            docs: resolve_types(devices.docs, &types.docs, self.config().missing_types)?,
            possibly_truncated: devices.possibly_truncated,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn device(id: &str, type_id: &str) -> Device {
        Device {
            id: id.into(),
            name: id.into(),
            device_type: DeviceType::reference(type_id),
            roles: vec![Role::new("ControlProcessor")],
            ..Device::default()
        }
    }

    fn pi() -> DeviceType {
        DeviceType {
            description: "Raspberry Pi".into(),
            input: true,
            ..DeviceType::reference("Pi3")
        }
    }

    #[test]
    fn substitutes_full_type() {
        let devices = vec![device("ITB-1101-CP1", "Pi3")];
        let resolved = resolve_types(devices, &[pi()], MissingTypePolicy::Omit).unwrap();
        assert_eq!(resolved[0].device_type, pi());
    }

    #[test]
    fn omit_policy_drops_unresolvable_devices() {
        let devices = vec![device("ITB-1101-CP1", "Pi3"), device("ITB-1101-D1", "Gone")];
        let resolved = resolve_types(devices, &[pi()], MissingTypePolicy::Omit).unwrap();
        let ids: Vec<_> = resolved.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["ITB-1101-CP1"]);
    }

    #[test]
    fn fail_policy_names_the_missing_type() {
        let devices = vec![device("ITB-1101-D1", "Gone")];
        let err = resolve_types(devices, &[pi()], MissingTypePolicy::Fail).unwrap_err();
        assert!(
            matches!(err, CoreError::NotFound { entity: EntityKind::DeviceType, ref id } if id == "Gone")
        );
    }
}
