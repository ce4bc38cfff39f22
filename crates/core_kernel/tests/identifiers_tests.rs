//! Tests for strongly-typed identifiers

use core_kernel::{
    HospitalId, NotificationId, PatientId, StaffId, TaskInstanceId, TaskTemplateId,
};
use uuid::Uuid;

mod patient_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = PatientId::new();
        let id2 = PatientId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_is_time_ordered() {
        let id1 = PatientId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = PatientId::new_v7();
        assert!(id1.as_uuid() < id2.as_uuid());
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = PatientId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(PatientId::prefix(), "PAT");
    }

    #[test]
    fn test_display_includes_prefix() {
        let id = PatientId::new();
        assert!(id.to_string().starts_with("PAT-"));
    }

    #[test]
    fn test_parse_round_trip() {
        let original = PatientId::new();
        let string = original.to_string();
        let parsed: PatientId = string.parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parse_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: PatientId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_from_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id: PatientId = uuid.into();
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_serde_round_trip() {
        let id = PatientId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: PatientId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        // The prefix is a display affordance only; the wire form is the UUID
        let id = PatientId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod task_id_tests {
    use super::*;

    #[test]
    fn test_template_and_instance_prefixes() {
        assert_eq!(TaskTemplateId::prefix(), "TPL");
        assert_eq!(TaskInstanceId::prefix(), "TSK");
    }

    #[test]
    fn test_instance_id_parse_round_trip() {
        let original = TaskInstanceId::new();
        let parsed: TaskInstanceId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<TaskInstanceId>().is_err());
    }
}

mod cross_type_tests {
    use super::*;

    #[test]
    fn test_id_types_are_distinct() {
        // Same underlying UUID, different types: identical bytes, but the
        // compiler keeps a PatientId out of a StaffId position
        let uuid = Uuid::new_v4();
        let patient_id = PatientId::from_uuid(uuid);
        let staff_id = StaffId::from_uuid(uuid);
        assert_eq!(*patient_id.as_uuid(), *staff_id.as_uuid());
    }

    #[test]
    fn test_all_prefixes_are_unique() {
        let prefixes = [
            PatientId::prefix(),
            StaffId::prefix(),
            HospitalId::prefix(),
            TaskTemplateId::prefix(),
            TaskInstanceId::prefix(),
            NotificationId::prefix(),
        ];
        let unique: std::collections::HashSet<_> = prefixes.iter().collect();
        assert_eq!(unique.len(), prefixes.len());
    }
}

mod edge_cases {
    use super::*;

    #[test]
    fn test_nil_uuid() {
        let id = HospitalId::from_uuid(Uuid::nil());
        assert!(id.as_uuid().is_nil());
        let parsed: HospitalId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_max_uuid() {
        let id = HospitalId::from_uuid(Uuid::max());
        let parsed: HospitalId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
