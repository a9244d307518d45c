//! Records-management model vocabulary.
//!
//! Dictionary names and permission names shared by the capability engine,
//! the entry voter and the repository fixtures.

use crate::qname::QName;

/// Content model types.
pub const TYPE_CONTENT: QName = QName::from_static("cm", "content");
pub const TYPE_FOLDER: QName = QName::from_static("cm", "folder");

/// File-plan types.
pub const TYPE_FILE_PLAN: QName = QName::from_static("rma", "filePlan");
pub const TYPE_RECORD_CATEGORY: QName = QName::from_static("rma", "recordCategory");
pub const TYPE_RECORD_FOLDER: QName = QName::from_static("rma", "recordFolder");
pub const TYPE_HOLD_CONTAINER: QName = QName::from_static("rma", "holdContainer");
pub const TYPE_HOLD: QName = QName::from_static("rma", "hold");
pub const TYPE_TRANSFER_CONTAINER: QName = QName::from_static("rma", "transferContainer");
pub const TYPE_TRANSFER: QName = QName::from_static("rma", "transfer");
pub const TYPE_UNFILED_RECORD_CONTAINER: QName =
    QName::from_static("rma", "unfiledRecordContainer");
pub const TYPE_UNFILED_RECORD_FOLDER: QName = QName::from_static("rma", "unfiledRecordFolder");
pub const TYPE_DISPOSITION_SCHEDULE: QName = QName::from_static("rma", "dispositionSchedule");
pub const TYPE_DISPOSITION_ACTION_DEFINITION: QName =
    QName::from_static("rma", "dispositionActionDefinition");

/// Aspects.
pub const ASPECT_FILE_PLAN_COMPONENT: QName = QName::from_static("rma", "filePlanComponent");
pub const ASPECT_RECORD: QName = QName::from_static("rma", "record");
pub const ASPECT_DECLARED_RECORD: QName = QName::from_static("rma", "declaredRecord");
pub const ASPECT_VITAL_RECORD: QName = QName::from_static("rma", "vitalRecord");
pub const ASPECT_CUT_OFF: QName = QName::from_static("rma", "cutOff");
pub const ASPECT_TRANSFERRED: QName = QName::from_static("rma", "transferred");
pub const ASPECT_GHOSTED: QName = QName::from_static("rma", "ghosted");
pub const ASPECT_FROZEN: QName = QName::from_static("rma", "frozen");

/// Properties.
pub const PROP_IS_CLOSED: QName = QName::from_static("rma", "isClosed");
pub const PROP_VITAL_RECORD_INDICATOR: QName = QName::from_static("rma", "vitalRecordIndicator");
pub const PROP_DISPOSITION_AS_OF: QName = QName::from_static("rma", "dispositionAsOf");
pub const PROP_HOLD_REASON: QName = QName::from_static("rma", "holdReason");
pub const PROP_OWNER: QName = QName::from_static("cm", "owner");
pub const PROP_CREATOR: QName = QName::from_static("cm", "creator");
pub const PROP_NAME: QName = QName::from_static("cm", "name");

/// Association types.
pub const ASSOC_CONTAINS: QName = QName::from_static("cm", "contains");
pub const ASSOC_FROZEN_CONTENT: QName = QName::from_static("rma", "frozenContent");

/// Permission names understood by the permission collaborator.
///
/// Most records-management permissions share the name of the capability
/// they guard; the role that grants a capability grants the permission.
pub mod permissions {
    pub const READ: &str = "Read";
    pub const WRITE: &str = "Write";
    pub const DELETE: &str = "Delete";

    pub const READ_RECORDS: &str = "ReadRecords";
    pub const FILING: &str = "Filing";
    pub const ROLE_ADMINISTRATOR: &str = "Administrator";

    pub const VIEW_RECORDS: &str = "ViewRecords";
    pub const FILE_RECORDS: &str = "FileRecords";
    pub const CREATE_RECORDS: &str = "CreateRecords";
    pub const DECLARE_RECORDS: &str = "DeclareRecords";
    pub const DELETE_RECORDS: &str = "DeleteRecords";
    pub const MOVE_RECORDS: &str = "MoveRecords";
    pub const DESTROY_RECORDS: &str = "DestroyRecords";
    pub const CREATE_MODIFY_DESTROY_FOLDERS: &str = "CreateModifyDestroyFolders";
    pub const CREATE_MODIFY_DESTROY_FILEPLAN_METADATA: &str = "CreateModifyDestroyFileplanMetadata";
    pub const DECLARE_RECORDS_IN_CLOSED_FOLDERS: &str = "DeclareRecordsInClosedFolders";
    pub const CREATE_MODIFY_RECORDS_IN_CUTOFF_FOLDERS: &str = "CreateModifyRecordsInCutoffFolders";
    pub const CHANGE_OR_DELETE_REFERENCES: &str = "ChangeOrDeleteReferences";
    pub const DELETE_LINKS: &str = "DeleteLinks";
    pub const EDIT_RECORD_METADATA: &str = "EditRecordMetadata";
    pub const EDIT_NON_RECORD_METADATA: &str = "EditNonRecordMetadata";
    pub const EDIT_DECLARED_RECORD_METADATA: &str = "EditDeclaredRecordMetadata";
    pub const CLOSE_FOLDERS: &str = "CloseFolders";
    pub const ADD_TO_HOLD: &str = "AddToHold";
    pub const REMOVE_FROM_HOLD: &str = "RemoveFromHold";
    pub const VIEW_UPDATE_REASONS_FOR_FREEZE: &str = "ViewUpdateReasonsForFreeze";
    pub const MANAGE_ACCESS_CONTROLS: &str = "ManageAccessControls";
    pub const APPROVE_RECORDS_SCHEDULED_FOR_CUTOFF: &str = "ApproveRecordsScheduledForCutoff";
    pub const MANUALLY_CHANGE_DISPOSITION_DATES: &str = "ManuallyChangeDispositionDates";
    pub const UPDATE_VITAL_RECORD_CYCLE_INFORMATION: &str = "UpdateVitalRecordCycleInformation";
}
