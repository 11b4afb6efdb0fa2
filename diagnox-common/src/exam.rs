//! Exam type identifiers.

/// Bone-age estimation. Patient sex is relevant to the result.
pub const BONE_AGE_EXAM: &str = "idade_ossea";

/// Whether an exam type needs `patient_sex` to be interpreted.
pub fn requires_patient_sex(exam_type: &str) -> bool {
    exam_type == BONE_AGE_EXAM
}
