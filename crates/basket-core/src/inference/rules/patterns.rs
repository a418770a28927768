//! Common regex patterns for hardware quote text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Value normalizers
    pub static ref CAPACITY: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(TB|GB|MB)\b"
    ).unwrap();

    pub static ref FREQUENCY: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*GHz\b"
    ).unwrap();

    pub static ref CORES: Regex = Regex::new(
        r"(?i)\b(\d+)\s*(?:C|-?cores?)\b"
    ).unwrap();

    // "8C/16T" or "16 threads"; a bare "4410T" is a model suffix.
    pub static ref THREADS: Regex = Regex::new(
        r"(?i)(?:C\s*/\s*(\d+)\s*T\b|\b(\d+)\s*-?threads?\b)"
    ).unwrap();

    pub static ref TDP: Regex = Regex::new(
        r"(?i)\b(\d+)\s*W\b"
    ).unwrap();

    pub static ref DDR_TYPE: Regex = Regex::new(
        r"(?i)DDR(\d)"
    ).unwrap();

    pub static ref MEMORY_SPEED: Regex = Regex::new(
        r"(?i)\b(\d{4})\s*(MT/s|MHz)"
    ).unwrap();

    pub static ref SLOT_SIZE: Regex = Regex::new(
        r#"(?i)\b([1-3]\.5)\s*(?:"|''|-?inch\b|in\b)"#
    ).unwrap();

    pub static ref DRIVE_INTERFACE: Regex = Regex::new(
        r"(?i)\b(NVMe|SAS|SATA)\b"
    ).unwrap();

    pub static ref PORT_TYPE: Regex = Regex::new(
        r"(?i)(BASE-T|QSFP56|QSFP28|SFP56|SFP28|SFP\+|\bSFP\b|RJ-?45)"
    ).unwrap();

    // Processor
    pub static ref PROCESSOR_COUNT_MODEL: Regex = Regex::new(
        r"(?i)^\s*(?P<count>\d+)\s*x\s*(?:Intel\s+|AMD\s+)?(?:(?:Xeon|EPYC)\s+)?(?:(?:Bronze|Silver|Gold|Platinum|Max)\s+)?(?P<model>[A-Z0-9][\w-]*)(?:\s*\((?P<cores>\d+)C/(?P<threads>\d+)T(?:\s*,?\s*(?P<frequency>\d+(?:\.\d+)?)\s*GHz)?\s*\))?"
    ).unwrap();

    pub static ref PROCESSOR_FAMILY_MODEL: Regex = Regex::new(
        r"(?i)\b(?:Xeon|EPYC)\s+(?:(?:Bronze|Silver|Gold|Platinum|Max)\s+)?(?P<model>\d[\w-]*)"
    ).unwrap();

    // Memory
    pub static ref MEMORY_TOTAL_MODULES: Regex = Regex::new(
        r"(?i)(?P<total>\d+(?:\.\d+)?\s*[GT]B)\s*\(\s*(?P<modules>\d+)\s*x\s*(?P<module_capacity>\d+(?:\.\d+)?\s*[GT]B)\s*\)"
    ).unwrap();

    pub static ref MEMORY_TRUDDR: Regex = Regex::new(
        r"(?i)(?P<capacity>\d+\s*[GT]B)\s+TruDDR(?P<generation>\d)\s+(?P<speed>\d+\s*(?:MHz|MT/s)).*?\b(?P<form_factor>3DS\s+RDIMM|LRDIMM|RDIMM|UDIMM|SODIMM)"
    ).unwrap();

    pub static ref MEMORY_DIMM: Regex = Regex::new(
        r"(?i)(?P<capacity>\d+\s*[GT]B)\s+(?:DDR(?P<generation>\d)\s+)?(?P<form_factor>LRDIMM|RDIMM|UDIMM|SODIMM|DIMM)\b(?:\s*,?\s*(?P<speed>\d+\s*(?:MT/s|MHz)))?"
    ).unwrap();

    pub static ref MEMORY_MODULES: Regex = Regex::new(
        r"(?i)^\s*(?P<modules>\d+)\s*x\s*(?P<module_capacity>\d+\s*[GT]B)\b"
    ).unwrap();

    pub static ref MEMORY_TOTAL_ONLY: Regex = Regex::new(
        r"(?i)^\s*(?P<total>\d+\s*[GT]B)\s*(?:RAM|memory)?\s*$"
    ).unwrap();

    // Storage
    pub static ref STORAGE_RAID: Regex = Regex::new(
        r"(?i)\b(?P<raid>PERC\s+H\d{3,4}[A-Z]*|RAID\s+\d{3,4}-\d+i|HBA\s?\d{3,4}[A-Z]*|BOSS-[A-Z]\d+)"
    ).unwrap();

    pub static ref STORAGE_BACKPLANE: Regex = Regex::new(
        r#"(?i)(?P<slot_count>\d+)\s*x\s*(?P<slot_size>[1-3]\.5)\s*(?:"|''|in\b)?\s*(?P<interface>SAS/SATA/NVMe|SAS/SATA|NVMe|SAS|SATA)?.*?\bBackplane"#
    ).unwrap();

    pub static ref STORAGE_SLOTS: Regex = Regex::new(
        r#"(?i)(?P<slot_count>\d+)\s*x\s*(?P<slot_size>[1-3]\.5)\s*(?:"|''|-?inch\b|in\b)"#
    ).unwrap();

    pub static ref STORAGE_CHASSIS_BAYS: Regex = Regex::new(
        r#"(?i)(?P<slot_size>[1-3]\.5)\s*(?:"|'')?\s*Chassis\s+with\s+(?:up\s+to\s+)?(?P<slot_count>\d+)\b"#
    ).unwrap();

    pub static ref STORAGE_DRIVE: Regex = Regex::new(
        r"(?i)(?P<capacity>\d+(?:\.\d+)?\s*[GT]B)\b.*?\b(?P<interface>NVMe|SAS|SATA)\b"
    ).unwrap();

    // Network
    pub static ref NETWORK_WORD_PORTS: Regex = Regex::new(
        r"(?i)\b(?P<ports>Single|Dual|Quad|Two|Four|\d+)[\s-]*Port\b.*?\b(?P<port_speed>\d+(?:/\d+)*)\s*Gb(?:E|ps)?\b"
    ).unwrap();

    pub static ref NETWORK_SPEED_PORTS: Regex = Regex::new(
        r"(?i)\b(?P<port_speed>\d+(?:/\d+)*)\s*Gb(?:E|ps)?\s+(?:(?P<port_type>QSFP56|QSFP28|SFP56|SFP28|SFP\+|SFP|BASE-T)\s+)?(?P<ports>\d+)[\s-]*port"
    ).unwrap();

    pub static ref NETWORK_COUNT_SPEED: Regex = Regex::new(
        r"(?i)\b(?P<ports>\d+)\s*x\s*(?P<port_speed>\d+(?:/\d+)*)\s*Gb(?:E|ps)?\b"
    ).unwrap();

    // Lot headings
    pub static ref LOT_MARKER: Regex = Regex::new(
        r"^[A-Z]{2,4}\d{1,2}\s*[-:]"
    ).unwrap();

    pub static ref LOT_CODE: Regex = Regex::new(
        r"^\s*([A-Z]{2,4}\d{1,2})\b"
    ).unwrap();

    pub static ref HEADING_WARRANTY: Regex = Regex::new(
        r"(?i)\b(\d+)\s*-?\s*(?:yr|yrs|year|years)\s+(?:Basic\s+)?Warranty\b"
    ).unwrap();

    pub static ref FORM_FACTOR: Regex = Regex::new(
        r"(?i)\b(\d)\s*U\b"
    ).unwrap();

    pub static ref TOWER: Regex = Regex::new(
        r"(?i)\btower\b"
    ).unwrap();

    pub static ref LENOVO_MODEL: Regex = Regex::new(
        r"(?i)\b(?P<number>S[RT]\d{3}[A-Z]?)\b(?:\s+(?P<version>V\d))?"
    ).unwrap();

    pub static ref THINKAGILE_MODEL: Regex = Regex::new(
        r"(?i)\bThinkAgile\s+(?P<family>VX|HX|MX)\s*(?P<number>\d{3,4}[A-Z]?)?"
    ).unwrap();

    pub static ref DELL_MODEL: Regex = Regex::new(
        r"(?i)\b(?:PowerEdge\s+)?(?P<number>[RTMC]\d{3,4}[A-Z]{0,2})\b"
    ).unwrap();

    // Support headers
    pub static ref SUPPORT_DURATION: Regex = Regex::new(
        r"(?i)\b(\d+)\s*-?\s*(?:y|yr|yrs|year|years)\b"
    ).unwrap();
}
