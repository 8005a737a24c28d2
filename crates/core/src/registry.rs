//! Id-keyed lookup tables for every mirrored device category.
//!
//! Registration is append-only (nothing is ever removed) and keyed by
//! [`CommunicationId`]. Re-registering a non-alarm id replaces its handle;
//! alarm registrations merge into one record per id, so the panel and its
//! launcher sub-entities can arrive in any order.

use std::collections::BTreeMap;
use std::sync::Arc;

use minilink_protocol::CommunicationId;

use crate::device::{
    AlarmHandle, AnalogSensorHandle, BinarySensorHandle, ConnectedLightKind, LauncherPart,
    LauncherPartHandle, RgbStripHandle, SwitchHandle, TelevisionHandle,
};

/// Alarm panel with its optional launcher sub-entities, all sharing one id.
#[derive(Default, Clone)]
pub struct AlarmRecord {
    panel: Option<Arc<dyn AlarmHandle>>,
    parts: BTreeMap<LauncherPart, Arc<dyn LauncherPartHandle>>,
}

impl AlarmRecord {
    #[must_use]
    pub fn panel(&self) -> Option<&dyn AlarmHandle> {
        self.panel.as_deref()
    }

    #[must_use]
    pub fn part(&self, part: LauncherPart) -> Option<&dyn LauncherPartHandle> {
        self.parts.get(&part).map(AsRef::as_ref)
    }
}

/// A hub-owned light mirrored over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedLight {
    pub entity_id: String,
    pub kind: ConnectedLightKind,
}

/// Registration tables for every device the daemon mirrors.
#[derive(Default)]
pub struct DeviceRegistry {
    switches: BTreeMap<CommunicationId, Arc<dyn SwitchHandle>>,
    binary_sensors: BTreeMap<CommunicationId, Arc<dyn BinarySensorHandle>>,
    analog_sensors: BTreeMap<CommunicationId, Arc<dyn AnalogSensorHandle>>,
    alarms: BTreeMap<CommunicationId, AlarmRecord>,
    televisions: BTreeMap<CommunicationId, Arc<dyn TelevisionHandle>>,
    rgb_strips: BTreeMap<CommunicationId, Arc<dyn RgbStripHandle>>,
    connected_lights: BTreeMap<CommunicationId, ConnectedLight>,
    light_slots: BTreeMap<String, CommunicationId>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ────────────────────────────────────────────────────

    pub fn register_switch(&mut self, id: CommunicationId, handle: Arc<dyn SwitchHandle>) {
        self.switches.insert(id, handle);
    }

    pub fn register_binary_sensor(
        &mut self,
        id: CommunicationId,
        handle: Arc<dyn BinarySensorHandle>,
    ) {
        self.binary_sensors.insert(id, handle);
    }

    pub fn register_analog_sensor(
        &mut self,
        id: CommunicationId,
        handle: Arc<dyn AnalogSensorHandle>,
    ) {
        self.analog_sensors.insert(id, handle);
    }

    /// Register or replace the panel of the alarm record at `id`.
    pub fn register_alarm(&mut self, id: CommunicationId, panel: Arc<dyn AlarmHandle>) {
        self.alarms.entry(id).or_default().panel = Some(panel);
    }

    /// Register or replace one launcher sub-entity of the alarm record at `id`.
    pub fn register_launcher_part(
        &mut self,
        id: CommunicationId,
        part: LauncherPart,
        handle: Arc<dyn LauncherPartHandle>,
    ) {
        self.alarms.entry(id).or_default().parts.insert(part, handle);
    }

    pub fn register_television(&mut self, id: CommunicationId, handle: Arc<dyn TelevisionHandle>) {
        self.televisions.insert(id, handle);
    }

    pub fn register_rgb_strip(&mut self, id: CommunicationId, handle: Arc<dyn RgbStripHandle>) {
        self.rgb_strips.insert(id, handle);
    }

    /// Register a hub-owned light, resolvable by id and by entity id.
    pub fn register_connected_light(
        &mut self,
        id: CommunicationId,
        entity_id: impl Into<String>,
        kind: ConnectedLightKind,
    ) {
        let entity_id = entity_id.into();
        let light = ConnectedLight {
            entity_id: entity_id.clone(),
            kind,
        };
        if let Some(previous) = self.connected_lights.insert(id, light) {
            self.light_slots.remove(&previous.entity_id);
        }
        self.light_slots.insert(entity_id, id);
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn switch(&self, id: CommunicationId) -> Option<&dyn SwitchHandle> {
        self.switches.get(&id).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn binary_sensor(&self, id: CommunicationId) -> Option<&dyn BinarySensorHandle> {
        self.binary_sensors.get(&id).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn analog_sensor(&self, id: CommunicationId) -> Option<&dyn AnalogSensorHandle> {
        self.analog_sensors.get(&id).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn alarm(&self, id: CommunicationId) -> Option<&AlarmRecord> {
        self.alarms.get(&id)
    }

    #[must_use]
    pub fn alarm_panel(&self, id: CommunicationId) -> Option<&dyn AlarmHandle> {
        self.alarms.get(&id).and_then(AlarmRecord::panel)
    }

    #[must_use]
    pub fn launcher_part(
        &self,
        id: CommunicationId,
        part: LauncherPart,
    ) -> Option<&dyn LauncherPartHandle> {
        self.alarms.get(&id).and_then(|record| record.part(part))
    }

    #[must_use]
    pub fn television(&self, id: CommunicationId) -> Option<&dyn TelevisionHandle> {
        self.televisions.get(&id).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn rgb_strip(&self, id: CommunicationId) -> Option<&dyn RgbStripHandle> {
        self.rgb_strips.get(&id).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn connected_light(&self, id: CommunicationId) -> Option<&ConnectedLight> {
        self.connected_lights.get(&id)
    }

    /// Reverse lookup: hub entity id to board slot.
    #[must_use]
    pub fn connected_light_slot(&self, entity_id: &str) -> Option<CommunicationId> {
        self.light_slots.get(entity_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minilink_protocol::AlarmState;

    struct NullAlarm;

    impl AlarmHandle for NullAlarm {
        fn publish_armed(&self, _armed: bool) {}
        fn publish_state(&self, _state: AlarmState) {}
    }

    struct NullPart;

    impl LauncherPartHandle for NullPart {
        fn publish_value(&self, _value: u32) {}
    }

    struct NullSwitch;

    impl SwitchHandle for NullSwitch {
        fn publish_power(&self, _on: bool) {}
    }

    fn id(value: u8) -> CommunicationId {
        CommunicationId::new(value)
    }

    // ── Alarm composite merging ─────────────────────────────────────────

    #[test]
    fn should_merge_panel_and_parts_in_any_order() {
        let mut registry = DeviceRegistry::new();
        registry.register_launcher_part(id(8), LauncherPart::Base, Arc::new(NullPart));
        registry.register_alarm(id(8), Arc::new(NullAlarm));
        registry.register_launcher_part(id(8), LauncherPart::Elevation, Arc::new(NullPart));

        let record = registry.alarm(id(8)).unwrap();
        assert!(record.panel().is_some());
        assert!(record.part(LauncherPart::Base).is_some());
        assert!(record.part(LauncherPart::Elevation).is_some());
        assert!(record.part(LauncherPart::MissilesRemaining).is_none());
    }

    #[test]
    fn should_keep_parts_when_panel_is_re_registered() {
        let mut registry = DeviceRegistry::new();
        registry.register_alarm(id(8), Arc::new(NullAlarm));
        registry.register_launcher_part(id(8), LauncherPart::Trigger, Arc::new(NullPart));
        registry.register_alarm(id(8), Arc::new(NullAlarm));

        let record = registry.alarm(id(8)).unwrap();
        assert!(record.part(LauncherPart::Trigger).is_some());
    }

    #[test]
    fn should_expose_no_panel_for_part_only_record() {
        let mut registry = DeviceRegistry::new();
        registry.register_launcher_part(id(8), LauncherPart::Base, Arc::new(NullPart));

        assert!(registry.alarm(id(8)).is_some());
        assert!(registry.alarm_panel(id(8)).is_none());
    }

    // ── Plain categories ────────────────────────────────────────────────

    #[test]
    fn should_replace_handle_on_re_registration() {
        let mut registry = DeviceRegistry::new();
        let first: Arc<dyn SwitchHandle> = Arc::new(NullSwitch);
        let second: Arc<dyn SwitchHandle> = Arc::new(NullSwitch);
        registry.register_switch(id(1), Arc::clone(&first));
        registry.register_switch(id(1), Arc::clone(&second));

        assert!(registry.switch(id(1)).is_some());
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(Arc::strong_count(&second), 2);
    }

    #[test]
    fn should_miss_unregistered_ids() {
        let registry = DeviceRegistry::new();
        assert!(registry.switch(id(1)).is_none());
        assert!(registry.television(id(1)).is_none());
        assert!(registry.alarm(id(1)).is_none());
    }

    // ── Connected lights ────────────────────────────────────────────────

    #[test]
    fn should_resolve_connected_light_both_ways() {
        let mut registry = DeviceRegistry::new();
        registry.register_connected_light(id(4), "light.desk", ConnectedLightKind::ColorVariable);

        let light = registry.connected_light(id(4)).unwrap();
        assert_eq!(light.entity_id, "light.desk");
        assert_eq!(light.kind, ConnectedLightKind::ColorVariable);
        assert_eq!(registry.connected_light_slot("light.desk"), Some(id(4)));
        assert_eq!(registry.connected_light_slot("light.other"), None);
    }

    #[test]
    fn should_drop_stale_reverse_mapping_on_replacement() {
        let mut registry = DeviceRegistry::new();
        registry.register_connected_light(id(4), "light.desk", ConnectedLightKind::Binary);
        registry.register_connected_light(id(4), "light.shelf", ConnectedLightKind::Binary);

        assert_eq!(registry.connected_light_slot("light.desk"), None);
        assert_eq!(registry.connected_light_slot("light.shelf"), Some(id(4)));
    }
}
