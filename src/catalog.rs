use serde::Serialize;

pub const CIE_MAX: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub key: &'static str,
    pub name: &'static str,
    pub cie_max: u32,
    pub sem_max: u32,
    pub credit: u32,
}

impl Subject {
    const fn new(key: &'static str, name: &'static str, sem_max: u32, credit: u32) -> Self {
        Self {
            key,
            name,
            cie_max: CIE_MAX,
            sem_max,
            credit,
        }
    }

    /// End-sem out of 50 means the two components already sum to 100.
    pub fn sem_out_of_fifty(&self) -> bool {
        self.sem_max == 50
    }

    pub fn cie_hint(&self) -> String {
        format!("CIE (out of {})", self.cie_max)
    }

    pub fn sem_hint(&self) -> String {
        format!("End Sem (out of {})", self.sem_max)
    }
}

pub static SUBJECTS: [Subject; 8] = [
    Subject::new("math", "Mathematics for CSE Stream I", 100, 4),
    Subject::new("chem", "Chemistry/Physics for CSE Stream", 100, 4),
    Subject::new("caed", "CAE Drawing/C Programming", 100, 3),
    Subject::new(
        "plc",
        "Programming Language/Emerging Technology(PLC/ETC)",
        100,
        3,
    ),
    Subject::new("esc", "Engineering Science Course(ESC)", 100, 3),
    Subject::new("eng", "Professional Writing/Speaking Skill", 50, 1),
    Subject::new(
        "sfh",
        "Scientific Foundation of Health/Prototype Fabrication Lab",
        50,
        1,
    ),
    Subject::new("ico", "Indian Constitution/Saamskruthika Kannada", 50, 1),
];

pub fn find(key: &str) -> Option<&'static Subject> {
    SUBJECTS.iter().find(|s| s.key == key)
}
