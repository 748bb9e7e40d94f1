/// The language of all the text shown on the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Language {
    English,
    Portuguese,
}

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

impl Language {
    /// Accepts the short codes `en` and `pt`.
    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "pt" | "pt-br" | "portuguese" => Some(Language::Portuguese),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
        }
    }

    pub fn month_names(self) -> [&'static str; 12] {
        match self {
            Language::English => MONTHS_EN,
            Language::Portuguese => MONTHS_PT,
        }
    }

    pub fn page_title(self) -> &'static str {
        match self {
            Language::English => "Church Service Attendance Dashboard",
            Language::Portuguese => "Dashboard de Frequência dos Cultos",
        }
    }

    pub fn year_selector_label(self) -> &'static str {
        match self {
            Language::English => "Select the year:",
            Language::Portuguese => "Selecione o Ano:",
        }
    }

    pub fn no_data_message(self) -> &'static str {
        match self {
            Language::English => "No data available to display the charts.",
            Language::Portuguese => "Nenhum dado disponível para exibir os gráficos.",
        }
    }

    pub fn attendance_title(self, year: i32) -> String {
        match self {
            Language::English => format!("Service Attendance - {} (exact numbers)", year),
            Language::Portuguese => format!("Frequência dos Cultos - {} (com números exatos)", year),
        }
    }

    pub fn people_trace_name(self) -> &'static str {
        match self {
            Language::English => "No. of People",
            Language::Portuguese => "Qtd. de Pessoas",
        }
    }

    pub fn months_axis(self) -> &'static str {
        match self {
            Language::English => "Months",
            Language::Portuguese => "Meses",
        }
    }

    pub fn quantity_axis(self) -> &'static str {
        match self {
            Language::English => "Quantity",
            Language::Portuguese => "Quantidade",
        }
    }

    pub fn average_people_label(self) -> &'static str {
        match self {
            Language::English => "Average People",
            Language::Portuguese => "Média de Pessoas",
        }
    }

    pub fn average_people_title(self, year: i32) -> String {
        match self {
            Language::English => format!("Average People per Service - {}", year),
            Language::Portuguese => format!("Média de Pessoas por Culto - {}", year),
        }
    }

    pub fn average_visitors_label(self) -> &'static str {
        match self {
            Language::English => "Average Visitors",
            Language::Portuguese => "Média de Visitantes",
        }
    }

    pub fn average_visitors_title(self, year: i32) -> String {
        match self {
            Language::English => format!("Average Visitors per Service - {}", year),
            Language::Portuguese => format!("Média de Visitantes por Culto - {}", year),
        }
    }
}
