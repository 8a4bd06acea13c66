//! Classe entity - Classe (anno e sezione) di una sede e di un corso

use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Classe {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub anno: i32,
    pub sezione: String,
    pub ore_settimanali: i32,
    pub sede_id: i32,
    pub corso_id: i32,
    pub coordinatore_id: Option<i32>,
    pub segretario_id: Option<i32>,
}

impl Classe {
    /// Nome breve della classe, es. "3A"
    pub fn nome(&self) -> String {
        format!("{}{}", self.anno, self.sezione)
    }

    /// Le classi quinte sostengono l'esame di stato
    pub fn is_ultimo_anno(&self) -> bool {
        self.anno == 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn classe(anno: i32, sezione: &str) -> Classe {
        Classe {
            id: 1,
            timestamps: Timestamps::pre_persist(Utc::now()),
            anno,
            sezione: sezione.to_string(),
            ore_settimanali: 32,
            sede_id: 1,
            corso_id: 1,
            coordinatore_id: None,
            segretario_id: None,
        }
    }

    #[test]
    fn test_nome() {
        assert_eq!(classe(3, "A").nome(), "3A");
        assert_eq!(classe(1, "F").nome(), "1F");
    }

    #[test]
    fn test_ultimo_anno() {
        assert!(classe(5, "B").is_ultimo_anno());
        assert!(!classe(4, "B").is_ultimo_anno());
    }
}
