use serde::{Deserialize, Serialize};

/// Kind of catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductKind {
    /// Raw material (`MP`).
    #[serde(rename = "MP")]
    RawMaterial,
    /// Finished product (`PA`).
    #[serde(rename = "PA")]
    Finished,
    /// Service (`SV`).
    #[serde(rename = "SV")]
    Service,
    /// Intermediate: produced and consumed by other compositions (`SB`).
    #[serde(rename = "SB")]
    Intermediate,
    /// A kind this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// A product or input, as stored by the back end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    /// Owning company; filled in by the server.
    #[serde(rename = "empresa", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<u64>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo_sku", default)]
    pub sku: String,
    #[serde(rename = "tipo")]
    pub kind: ProductKind,
    #[serde(rename = "unidade_medida")]
    pub unit: String,
    /// Unit cost, decimal string.
    #[serde(rename = "preco_custo")]
    pub cost_price: String,
    pub is_active: bool,
}

/// Payload to create a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo_sku")]
    pub sku: String,
    #[serde(rename = "tipo")]
    pub kind: ProductKind,
    #[serde(rename = "unidade_medida")]
    pub unit: String,
    #[serde(rename = "preco_custo")]
    pub cost_price: String,
}

/// Partial update of a product; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductPatch {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "codigo_sku", skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProductKind>,
    #[serde(rename = "unidade_medida", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "preco_custo", skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// One line of a bill-of-materials: a component product and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionItem {
    /// Server-assigned; omitted when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Id of the component product.
    #[serde(rename = "componente")]
    pub component: u64,
    /// Decimal string.
    #[serde(rename = "quantidade", deserialize_with = "decimal::deserialize")]
    pub quantity: String,
}

/// A recipe mapping a finished product to its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub id: u64,
    #[serde(rename = "empresa", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<u64>,
    /// Id of the finished product this recipe produces.
    #[serde(rename = "produto_acabado")]
    pub finished_product: u64,
    #[serde(rename = "descricao", default)]
    pub description: String,
    /// Fixed extra cost added on top of the components, decimal string.
    #[serde(rename = "custo_adicional_fixo", deserialize_with = "decimal::deserialize")]
    pub fixed_extra_cost: String,
    #[serde(rename = "itens", default)]
    pub items: Vec<CompositionItem>,
}

/// Payload to create or fully replace a composition.
///
/// The server replaces the whole item list on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComposition {
    #[serde(rename = "produto_acabado")]
    pub finished_product: u64,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "custo_adicional_fixo")]
    pub fixed_extra_cost: String,
    #[serde(rename = "itens")]
    pub items: Vec<CompositionItem>,
}

mod decimal {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accepts a decimal either as a JSON string or as a JSON number.
    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected decimal string or number, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_deserialize_backend_shape() {
        let body = json!({
            "id": 3,
            "empresa": 1,
            "nome": "Farinha",
            "codigo_sku": "FAR-01",
            "tipo": "MP",
            "unidade_medida": "kg",
            "preco_custo": "4.5000",
            "is_active": true
        });
        let product: Product = serde_json::from_value(body).unwrap();
        assert_eq!(product.name, "Farinha");
        assert_eq!(product.kind, ProductKind::RawMaterial);
        assert_eq!(product.cost_price, "4.5000");
        assert_eq!(product.company, Some(1));
    }

    #[test]
    fn test_unknown_product_kind_does_not_fail_decode() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"id": 1, "nome": "Farinha", "tipo": "MP", "unidade_medida": "kg",
             "preco_custo": "4.50", "is_active": true},
            {"id": 2, "nome": "Embalagem", "tipo": "EM", "unidade_medida": "un",
             "preco_custo": "0.30", "is_active": true}
        ]))
        .unwrap();
        assert_eq!(products[0].kind, ProductKind::RawMaterial);
        assert_eq!(products[1].kind, ProductKind::Unknown);
    }

    #[test]
    fn test_product_patch_only_sends_set_fields() {
        let patch = ProductPatch {
            cost_price: Some("5.10".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"preco_custo": "5.10"}));
    }

    #[test]
    fn test_new_composition_serializes_nested_items() {
        let composition = NewComposition {
            finished_product: 10,
            description: "Pão".to_string(),
            fixed_extra_cost: "1.00".to_string(),
            items: vec![CompositionItem {
                id: None,
                component: 3,
                quantity: "0.5".to_string(),
            }],
        };
        let value = serde_json::to_value(&composition).unwrap();
        assert_eq!(value["produto_acabado"], 10);
        assert_eq!(value["itens"][0], json!({"componente": 3, "quantidade": "0.5"}));
    }

    #[test]
    fn test_composition_item_accepts_numeric_quantity() {
        let item: CompositionItem =
            serde_json::from_value(json!({"id": 1, "componente": 3, "quantidade": 2.5})).unwrap();
        assert_eq!(item.quantity, "2.5");
    }

    #[test]
    fn test_composition_item_rejects_boolean_quantity() {
        let result =
            serde_json::from_value::<CompositionItem>(json!({"componente": 3, "quantidade": true}));
        assert!(result.is_err());
    }
}
