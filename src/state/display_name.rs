//! Human-readable labels for enum values shown in menus.

use crate::state::data_model::{CellType, CurrencyType, DateFormat, FilterType, FunctionType, SortDir};

pub fn cell_type(value: CellType) -> &'static str {
    match value {
        CellType::Text => "Text",
        CellType::Number => "Number",
        CellType::Date => "Date",
        CellType::Tag => "Tag",
        CellType::MultiTag => "Multi-tag",
        CellType::Checkbox => "Checkbox",
        CellType::Currency => "Currency",
        CellType::CreationTime => "Creation time",
        CellType::LastEditedTime => "Last edited time",
        CellType::File => "File",
    }
}

pub fn filter_type(value: FilterType) -> &'static str {
    match value {
        FilterType::Is => "Is",
        FilterType::IsNot => "Is not",
        FilterType::Contains => "Contains",
        FilterType::DoesNotContain => "Does not contain",
        FilterType::StartsWith => "Starts with",
        FilterType::EndsWith => "Ends with",
        FilterType::IsEmpty => "Is empty",
        FilterType::IsNotEmpty => "Is not empty",
    }
}

pub fn date_format(value: DateFormat) -> &'static str {
    match value {
        DateFormat::MmDdYyyy => "MM/DD/YYYY",
        DateFormat::DdMmYyyy => "DD/MM/YYYY",
        DateFormat::YyyyMmDd => "YYYY/MM/DD",
        DateFormat::Full => "Full",
    }
}

pub fn currency_type(value: CurrencyType) -> &'static str {
    match value {
        CurrencyType::UnitedStates => "United States Dollar",
        CurrencyType::Canada => "Canadian Dollar",
        CurrencyType::Australia => "Australian Dollar",
        CurrencyType::Europe => "Euro",
        CurrencyType::UnitedKingdom => "Pound Sterling",
        CurrencyType::Japan => "Japanese Yen",
        CurrencyType::China => "Chinese Yuan",
        CurrencyType::India => "Indian Rupee",
        CurrencyType::Switzerland => "Swiss Franc",
    }
}

pub fn function_type(value: FunctionType) -> &'static str {
    match value {
        FunctionType::None => "None",
        FunctionType::CountAll => "Count all",
        FunctionType::CountValues => "Count values",
        FunctionType::CountUnique => "Count unique",
        FunctionType::CountEmpty => "Count empty",
        FunctionType::CountNotEmpty => "Count not empty",
        FunctionType::PercentEmpty => "Percent empty",
        FunctionType::PercentNotEmpty => "Percent not empty",
        FunctionType::Sum => "Sum",
        FunctionType::Avg => "Average",
        FunctionType::Min => "Min",
        FunctionType::Max => "Max",
        FunctionType::Median => "Median",
        FunctionType::Range => "Range",
    }
}

pub fn sort_dir(value: SortDir) -> &'static str {
    match value {
        SortDir::None => "Default",
        SortDir::Asc => "Ascending",
        SortDir::Desc => "Descending",
    }
}
