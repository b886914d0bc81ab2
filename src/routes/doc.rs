use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admins::{
            AdminList, CreateAdminRequest, DashboardStats, ResetAdminPasswordRequest,
            UpdateAdminRequest,
        },
        auth::{
            CompleteResetRequest, LoginRequest, LoginResponse, OAuthLoginRequest, RegisterRequest,
        },
        cart::{CartLine, CartLineProduct, CartSummary, MergeCartLine, MergeCartRequest, UpsertCartItemRequest},
        orders::{
            CustomerOrder, CustomerOrderItem, CustomerOrderList, OrderItemInput, OrderList,
            OrderTimeline, OrderWithItems, PlaceOrderRequest, PlaceOrderResponse,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
        users::{ResetUserPasswordRequest, UpdateUserRequest, UserList},
    },
    models::{Admin, Order, OrderItem, Product, Testimonial, User},
    order_status::{OrderStatus, TimelineStep},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, params, products, testimonials, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::admin_login,
        auth::oauth_login,
        auth::complete_reset,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        orders::get_order_timeline,
        orders::update_order_status,
        orders::delete_order,
        orders::list_customer_orders,
        cart::cart_list,
        cart::upsert_cart_item,
        cart::merge_cart,
        cart::remove_cart_items,
        testimonials::list_testimonials,
        testimonials::create_testimonial,
        testimonials::update_testimonial,
        testimonials::delete_testimonial,
        admin::list_admins,
        admin::get_admin,
        admin::create_admin,
        admin::update_admin,
        admin::delete_admin,
        admin::reset_admin_password,
        admin::dashboard,
        users::list_users,
        users::get_user,
        users::update_user,
        users::deactivate_user,
        users::reset_user_password
    ),
    components(
        schemas(
            Product,
            Order,
            OrderItem,
            User,
            Admin,
            Testimonial,
            OrderStatus,
            TimelineStep,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            OAuthLoginRequest,
            CompleteResetRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            PlaceOrderRequest,
            PlaceOrderResponse,
            OrderItemInput,
            OrderList,
            OrderWithItems,
            OrderTimeline,
            UpdateOrderStatusRequest,
            CustomerOrder,
            CustomerOrderItem,
            CustomerOrderList,
            UpsertCartItemRequest,
            MergeCartRequest,
            MergeCartLine,
            CartLine,
            CartLineProduct,
            CartSummary,
            CreateTestimonialRequest,
            UpdateTestimonialRequest,
            TestimonialList,
            CreateAdminRequest,
            UpdateAdminRequest,
            ResetAdminPasswordRequest,
            AdminList,
            DashboardStats,
            UpdateUserRequest,
            ResetUserPasswordRequest,
            UserList,
            params::SortOrder,
            params::ProductSortBy,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PlaceOrderResponse>,
            ApiResponse<CartSummary>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Customer and admin authentication"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Orders", description = "Checkout and order lifecycle"),
        (name = "Cart", description = "Server-side cart for signed-in customers"),
        (name = "Testimonials", description = "Storefront testimonials"),
        (name = "Admin", description = "Admin account management and dashboard"),
        (name = "Users", description = "Customer account administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
