//! Valutazione entity - Voto assegnato a un alunno in una materia

use super::enums::TipoValutazione;
use super::timestamps::Timestamps;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Valutazione {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub tipo: TipoValutazione,
    /// Visibile a genitori e alunni
    pub visibile: bool,
    /// Concorre alla media
    pub media: bool,
    // voto numerico in quarti di punto (6.25 = "6+"), assente per le sole valutazioni a giudizio
    pub voto: Option<f64>,
    pub giudizio: Option<String>,
    pub argomento: Option<String>,
    pub data: NaiveDate,
    pub docente_id: i32,
    pub alunno_id: i32,
    pub classe_id: i32,
    pub materia_id: i32,
}

impl Valutazione {
    /// Voto in forma testuale: 6 -> "6", 6.25 -> "6+", 6.5 -> "6½", 6.75 -> "7-"
    ///
    /// Stringa vuota se non c'è un voto positivo.
    pub fn voto_visualizzabile(&self) -> String {
        self.voto.map(formatta_voto).unwrap_or_default()
    }
}

/// Formatta un voto numerico con i suffissi +, - e ½
pub fn formatta_voto(voto: f64) -> String {
    if !(voto > 0.0) {
        return String::new();
    }
    let intero = (voto + 0.25).trunc() as i64;
    let decimali = voto - voto.trunc();
    let suffisso = if decimali == 0.25 {
        "+"
    } else if decimali == 0.75 {
        "-"
    } else if decimali == 0.5 {
        "½"
    } else {
        ""
    };
    format!("{}{}", intero, suffisso)
}

/// Media dei voti che concorrono alla media (visibili, con flag `media` e voto positivo)
///
/// Arrotondata a due decimali, `None` se nessun voto è utilizzabile.
pub fn media_voti<'a>(valutazioni: impl IntoIterator<Item = &'a Valutazione>) -> Option<f64> {
    let (somma, numero) = valutazioni
        .into_iter()
        .filter(|v| v.visibile && v.media)
        .filter_map(|v| v.voto)
        .filter(|voto| *voto > 0.0)
        .fold((0.0, 0u32), |(somma, numero), voto| (somma + voto, numero + 1));

    if numero == 0 {
        return None;
    }
    Some((somma / f64::from(numero) * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn valutazione(voto: Option<f64>) -> Valutazione {
        Valutazione {
            id: 1,
            timestamps: Timestamps::pre_persist(Utc::now()),
            tipo: TipoValutazione::Orale,
            visibile: true,
            media: true,
            voto,
            giudizio: None,
            argomento: None,
            data: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            docente_id: 2,
            alunno_id: 10,
            classe_id: 1,
            materia_id: 4,
        }
    }

    #[test]
    fn test_voto_visualizzabile() {
        assert_eq!(valutazione(Some(6.0)).voto_visualizzabile(), "6");
        assert_eq!(valutazione(Some(6.25)).voto_visualizzabile(), "6+");
        assert_eq!(valutazione(Some(6.5)).voto_visualizzabile(), "6½");
        assert_eq!(valutazione(Some(6.75)).voto_visualizzabile(), "7-");
        assert_eq!(valutazione(Some(10.0)).voto_visualizzabile(), "10");
        assert_eq!(valutazione(Some(0.75)).voto_visualizzabile(), "1-");
    }

    #[test]
    fn test_voto_visualizzabile_assente() {
        assert_eq!(valutazione(None).voto_visualizzabile(), "");
        assert_eq!(valutazione(Some(0.0)).voto_visualizzabile(), "");
        assert_eq!(valutazione(Some(-1.0)).voto_visualizzabile(), "");
    }

    #[test]
    fn test_media_voti() {
        let voti = vec![
            valutazione(Some(6.0)),
            valutazione(Some(7.5)),
            valutazione(Some(8.25)),
        ];
        assert_eq!(media_voti(&voti), Some(7.25));
    }

    #[test]
    fn test_media_esclude_voti_non_validi() {
        let mut nascosto = valutazione(Some(2.0));
        nascosto.visibile = false;
        let mut fuori_media = valutazione(Some(3.0));
        fuori_media.media = false;
        let voti = vec![
            valutazione(Some(7.0)),
            valutazione(None),
            valutazione(Some(0.0)),
            nascosto,
            fuori_media,
            valutazione(Some(8.0)),
        ];
        assert_eq!(media_voti(&voti), Some(7.5));
    }

    #[test]
    fn test_media_arrotondata() {
        let voti = vec![
            valutazione(Some(6.0)),
            valutazione(Some(6.0)),
            valutazione(Some(7.0)),
        ];
        assert_eq!(media_voti(&voti), Some(6.33));
    }

    #[test]
    fn test_media_senza_voti() {
        let voti: Vec<Valutazione> = vec![valutazione(None)];
        assert_eq!(media_voti(&voti), None);
    }
}
