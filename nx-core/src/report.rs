use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use nx_domain::TradeRoute;
use thousands::Separable;

pub fn format_number(value: f64) -> String {
    (value.round() as i64).separate_with_commas()
}

pub fn generate_trade_routes_table(trade_routes: &[TradeRoute]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .force_no_tty()
        .enforce_styling()
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "#",
            "Item",
            "From Base",
            "From System",
            "To Base",
            "To System",
            "Quantity",
            "Profit/Item",
            "Profit/Mass Unit",
            "Rating",
            "Life Support",
        ]);

    for (idx, tr) in trade_routes.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string().as_str(),
            tr.item_id.to_string().as_str(),
            tr.from_base_id.to_string().as_str(),
            tr.from_star_system_id.to_string().as_str(),
            tr.to_base_id.to_string().as_str(),
            tr.to_star_system_id.to_string().as_str(),
            format_number(tr.total_quantity as f64).as_str(),
            format_number(tr.profit_per_item as f64).as_str(),
            format!("{:.2}", tr.profit_per_mass_unit).as_str(),
            format!("{:.3}", tr.rating).as_str(),
            if tr.is_life_support_required { "yes" } else { "no" },
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nx_domain::{ItemId, MarketBaseId, NavigationPathId, StarSystemId};

    #[test]
    fn numbers_are_rounded_and_grouped() {
        assert_eq!(format_number(1234567.6), "1,234,568");
        assert_eq!(format_number(-4200.0), "-4,200");
        assert_eq!(format_number(7.0), "7");
    }

    #[test]
    fn table_lists_routes_in_given_order() {
        let trade_route = TradeRoute {
            from_base_id: MarketBaseId(11),
            from_star_system_id: StarSystemId(1),
            to_base_id: MarketBaseId(22),
            to_star_system_id: StarSystemId(2),
            item_id: ItemId(5),
            item_mass_units: 2,
            navigation_path_id: NavigationPathId(1),
            is_life_support_required: false,
            total_quantity: 6000,
            profit_per_item: 4,
            profit_per_mass_unit: 2.0,
            rating: 2.0 / 3.0,
        };

        let table = generate_trade_routes_table(&[trade_route]);

        assert!(table.contains("Profit/Mass Unit"));
        assert!(table.contains("6,000"));
        assert!(table.contains("0.667"));
        assert!(table.contains("2.00"));
    }
}
